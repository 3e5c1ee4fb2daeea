use clap::{Parser, Subcommand};
use formdef_compiler::{Bindings, Compiler, TypeRegistry};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "formdef")]
#[command(about = "Form definition compiler for JSON form documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a form and print the compiled form as JSON
    Build {
        /// Module the form belongs to
        module: String,

        /// Logical form name (resolved to Models/<module>/<form>.json)
        form: String,

        /// Application root containing the Models directory
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Submission action name for the compiled form
        #[arg(long)]
        action: String,

        /// Bindings as name=value pairs, may be repeated
        #[arg(long = "bind")]
        bindings: Vec<String>,
    },

    /// Check a form definition file for errors without compiling it
    Check {
        /// Path to a .json form definition
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            module,
            form,
            root,
            action,
            bindings,
        } => cmd_build(&module, &form, &root, &action, &bindings),
        Command::Check { path } => cmd_check(&path),
    }
}

fn parse_bindings(pairs: &[String]) -> Bindings {
    let mut bindings = Bindings::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((name, value)) => {
                bindings.set(name.trim(), serde_json::Value::String(value.to_string()));
            }
            None => {
                eprintln!("Error: binding '{pair}' is not in name=value form");
                std::process::exit(1);
            }
        }
    }
    bindings
}

fn cmd_build(module: &str, form: &str, root: &Path, action: &str, binding_pairs: &[String]) {
    let bindings = parse_bindings(binding_pairs);
    let compiler = Compiler::new(TypeRegistry::new());

    let compiled = match compiler.load_and_compile(root, module, form, action, &bindings) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&compiled) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing compiled form: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(path: &str) {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    let source = match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    };

    // Module name only matters for compilation; the parent directory
    // name matches the Models/<module>/<form>.json layout when present.
    let module = p
        .parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("local");

    if let Err(e) = formdef_parser::parse_source(module, &source) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}
