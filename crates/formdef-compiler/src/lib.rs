//! Form Definition Compiler
//!
//! Turns a parsed `FormDocument` into a `CompiledForm`: a flat, ordered
//! list of concrete fields ready for rendering and validation.
//!
//! ```text
//! FormDocument → Compiler::compile(action, bindings) → CompiledForm
//! ```
//!
//! Expansion walks the document's field nodes in order. Leaf fields are
//! type-resolved and bind-substituted; `!section(...)` emits a header
//! then its body as a flat group; `!repeat(start, end)` stamps its body
//! out once per index with the loop index bound as `repeater`. Failures
//! are fail-fast: a partially populated form is never valid output.

pub mod bindings;
pub mod form;
pub mod types;

pub use bindings::Bindings;
pub use form::{CompiledForm, Field};
pub use types::{FieldType, TypeRegistry};

use bindings::substitute_options;
use formdef_parser::document::{FieldNode, LeafField, RepeatNode, SectionNode};
use formdef_parser::{FormDocument, LoadError};
use std::path::Path;

/// Semantic compilation error. Raised synchronously, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("unknown field type '{0}'")]
    UnknownType(String),

    #[error("repeat bounds {start} and {end} are the wrong way around")]
    ReversedRepeatBounds { start: u32, end: u32 },

    #[error("unbound form variable '{0}'")]
    UnboundVariable(String),
}

/// Any failure in the one-shot load-and-compile pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// The compiler itself. Holds only the injected type registry, so one
/// instance may serve any number of independent compilations.
pub struct Compiler {
    registry: TypeRegistry,
}

impl Compiler {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    /// Compile a parsed document against a submission action and a
    /// caller-supplied binding environment.
    pub fn compile(
        &self,
        doc: &FormDocument,
        action: &str,
        bindings: &Bindings,
    ) -> Result<CompiledForm, CompileError> {
        let mut target = CompiledForm::new(&doc.name, &doc.module, action, doc.options.clone());
        for (name, node) in &doc.fields {
            self.expand(name, node, &mut target, bindings, "")?;
        }
        Ok(target)
    }

    /// Resolve, parse, and compile a form in one call.
    pub fn load_and_compile(
        &self,
        root: &Path,
        module: &str,
        name: &str,
        action: &str,
        bindings: &Bindings,
    ) -> Result<CompiledForm, Error> {
        let doc = formdef_parser::load_document(root, module, name)?;
        Ok(self.compile(&doc, action, bindings)?)
    }

    /// Expand one named node into zero or more concrete fields.
    /// Directive bodies recurse through here, so directives may nest.
    ///
    /// `suffix` carries the accumulated repeat indices enclosing this
    /// node. It lands on every generated field name, leaf and header
    /// alike, which is what keeps names unique once a directive sits
    /// inside a repeat body.
    fn expand(
        &self,
        name: &str,
        node: &FieldNode,
        target: &mut CompiledForm,
        bindings: &Bindings,
        suffix: &str,
    ) -> Result<(), CompileError> {
        match node {
            FieldNode::Leaf(leaf) => self.expand_leaf(name, leaf, target, bindings, suffix),
            FieldNode::Section(section) => self.expand_section(section, target, bindings, suffix),
            FieldNode::Repeat(repeat) => self.expand_repeat(repeat, target, bindings, suffix),
        }
    }

    fn expand_leaf(
        &self,
        name: &str,
        leaf: &LeafField,
        target: &mut CompiledForm,
        bindings: &Bindings,
        suffix: &str,
    ) -> Result<(), CompileError> {
        let field_type = self
            .registry
            .resolve(&leaf.type_name)
            .ok_or_else(|| CompileError::UnknownType(leaf.type_name.clone()))?;
        let options = substitute_options(&leaf.options, bindings)?;
        target.add_field(Field::new(format!("{name}{suffix}"), field_type, options));
        Ok(())
    }

    /// Header first, then the body as a flat group against the same
    /// target and bindings. No nested scope is introduced; the
    /// enclosing suffix passes straight through to the body.
    fn expand_section(
        &self,
        section: &SectionNode,
        target: &mut CompiledForm,
        bindings: &Bindings,
        suffix: &str,
    ) -> Result<(), CompileError> {
        target.add_field(Field::section_header(&section.label, suffix));
        for (name, node) in &section.body {
            self.expand(name, node, target, bindings, suffix)?;
        }
        Ok(())
    }

    /// Bounds are checked before any field is added. Each iteration
    /// extends the suffix with its index, so every name generated under
    /// the body is unique across iterations as long as the base names
    /// are distinct.
    fn expand_repeat(
        &self,
        repeat: &RepeatNode,
        target: &mut CompiledForm,
        bindings: &Bindings,
        suffix: &str,
    ) -> Result<(), CompileError> {
        if repeat.start >= repeat.end {
            return Err(CompileError::ReversedRepeatBounds {
                start: repeat.start,
                end: repeat.end,
            });
        }

        for index in repeat.start..=repeat.end {
            let scoped = bindings.with_repeater(index);
            let indexed = format!("{suffix}{index}");
            for (name, node) in &repeat.body {
                self.expand(name, node, target, &scoped, &indexed)?;
            }
        }
        Ok(())
    }
}
