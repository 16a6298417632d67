//! Quill Programming Language
//!
//! Quill is a small statically-typed language. This crate is its front
//! end: a recursive-descent parser fused with a structural type checker,
//! producing a validated, typed AST and a list of diagnostics.

pub mod cli;
pub mod diagnostics;
pub mod parser;
pub mod scope;
pub mod types;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::diagnostics::{Diagnostic, DiagnosticBag, ErrorKind, Severity};
    pub use crate::parser::span::{Position, Span};
    pub use crate::parser::{check_source, Program};
    pub use crate::types::ExpressionType;
}
