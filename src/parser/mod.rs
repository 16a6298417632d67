//! Parser for the Quill programming language
//!
//! This module provides:
//! - Lexer (tokenization)
//! - Fused parser/checker (AST construction with immediate type checking)
//! - AST definitions
//! - Span tracking

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod span;

mod control;
mod definition;
mod expr;

pub use lexer::{Token, TokenKind, TokenStream};
pub use parser::Parser;

use crate::diagnostics::DiagnosticBag;
use crate::scope::{ScopeArena, ScopeId};

/// The outcome of a compilation run: the checked statements, the scope
/// arena they reference, and every diagnostic collected along the way.
pub struct Program {
    pub statements: Vec<ast::Stmt>,
    pub scopes: ScopeArena,
    pub diagnostics: DiagnosticBag,
    /// The top-level scope the statements were checked in.
    pub scope: ScopeId,
}

impl Program {
    /// A program may be handed to an emitter only when checking produced
    /// no errors. Warnings do not block emission.
    pub fn is_check_clean(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Parse and type-check a whole source text in a single fused pass.
pub fn check_source(source: &str) -> Program {
    let mut parser = Parser::new(source);
    let statements = parser.parse_program();
    let (scopes, diagnostics, scope) = parser.into_parts();
    Program {
        statements,
        scopes,
        diagnostics,
        scope,
    }
}

#[cfg(test)]
mod tests;
