//! Scope and symbol tracking
//!
//! Scopes live in an arena and are addressed by handle: pushing a lexical
//! construct returns a [`ScopeId`], and popping performs the unused-variable
//! scan. Variables record their read and write sites; a variable with no
//! reads when its scope is popped is reported unused.

use std::cell::OnceCell;

use crate::parser::span::Span;
use crate::types::ExpressionType;

/// Handle to a scope record in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScopeId(pub usize);

/// What kind of lexical construct a scope belongs to. Used to validate
/// `return`/`break`/`continue` legality by walking ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Block,
    Function,
    Loop,
}

/// A declared name: its type, declaration site, and usage sites.
#[derive(Debug)]
pub struct Variable {
    pub declared_at: Span,
    pub typing: ExpressionType,
    reads: Vec<Span>,
    writes: Vec<Span>,
    /// Call-site resolution slot for generic type parameters. Written at
    /// most once per instantiation scope; the first writer wins and later
    /// uses are checked against it, never re-bound.
    pub binding: OnceCell<ExpressionType>,
}

impl Variable {
    fn new(declared_at: Span, typing: ExpressionType) -> Self {
        Self {
            declared_at,
            typing,
            reads: Vec::new(),
            writes: Vec::new(),
            binding: OnceCell::new(),
        }
    }

    pub fn read_at(&mut self, span: Span) {
        self.reads.push(span);
    }

    pub fn write_at(&mut self, span: Span) {
        self.writes.push(span);
    }

    pub fn is_read(&self) -> bool {
        !self.reads.is_empty()
    }

    pub fn is_used(&self) -> bool {
        !self.reads.is_empty() || !self.writes.is_empty()
    }

    pub fn reads(&self) -> &[Span] {
        &self.reads
    }

    pub fn writes(&self) -> &[Span] {
        &self.writes
    }
}

#[derive(Debug)]
struct ScopeRecord {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    // insertion-ordered so diagnostics come out deterministically
    variables: Vec<(String, Variable)>,
}

/// The arena owning every scope of a compilation run. Index 0 is the
/// immutable root holding the standard bindings, built once per run.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<ScopeRecord>,
}

impl ScopeArena {
    /// Create an arena whose root scope holds the built-in bindings.
    pub fn new() -> Self {
        let mut arena = Self { scopes: Vec::new() };
        arena.scopes.push(ScopeRecord {
            kind: ScopeKind::Program,
            parent: None,
            variables: crate::types::builtins::root_bindings()
                .into_iter()
                .map(|(name, typing)| (name, Variable::new(Span::default(), typing)))
                .collect(),
        });
        arena
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a child scope, returning its handle.
    pub fn push(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeRecord {
            kind,
            parent: Some(parent),
            variables: Vec::new(),
        });
        id
    }

    pub fn parent(&self, at: ScopeId) -> Option<ScopeId> {
        self.scopes[at.0].parent
    }

    /// Bind a name in the given scope. `_` is never bound.
    pub fn add(&mut self, at: ScopeId, name: &str, declared_at: Span, typing: ExpressionType) {
        if name.is_empty() || name == "_" {
            return;
        }
        let record = &mut self.scopes[at.0];
        if let Some((_, existing)) = record.variables.iter_mut().find(|(n, _)| n == name) {
            *existing = Variable::new(declared_at, typing);
        } else {
            record
                .variables
                .push((name.to_string(), Variable::new(declared_at, typing)));
        }
    }

    /// Find the nearest binding for a name, walking outward.
    pub fn find(&self, at: ScopeId, name: &str) -> Option<&Variable> {
        let record = &self.scopes[at.0];
        match record.variables.iter().find(|(n, _)| n == name) {
            Some((_, variable)) => Some(variable),
            None => record.parent.and_then(|parent| self.find(parent, name)),
        }
    }

    pub fn find_mut(&mut self, at: ScopeId, name: &str) -> Option<&mut Variable> {
        let mut current = at;
        loop {
            // resolve the owning scope first to keep the borrow checker happy
            let found = self.scopes[current.0]
                .variables
                .iter()
                .any(|(n, _)| n == name);
            if found {
                return self.scopes[current.0]
                    .variables
                    .iter_mut()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v);
            }
            current = self.scopes[current.0].parent?;
        }
    }

    pub fn has(&self, at: ScopeId, name: &str) -> bool {
        self.find(at, name).is_some()
    }

    pub fn has_local(&self, at: ScopeId, name: &str) -> bool {
        self.scopes[at.0].variables.iter().any(|(n, _)| n == name)
    }

    /// Is the root (standard) scope the owner of this name?
    pub fn is_reserved(&self, name: &str) -> bool {
        self.scopes[0].variables.iter().any(|(n, _)| n == name)
    }

    /// Walk ancestors looking for a scope of the given kind.
    pub fn is_in(&self, at: ScopeId, kind: ScopeKind) -> bool {
        let record = &self.scopes[at.0];
        if record.kind == kind {
            return true;
        }
        match record.parent {
            Some(parent) => self.is_in(parent, kind),
            None => false,
        }
    }

    /// Names declared in this scope that were never used, in declaration
    /// order. Called when the scope is popped.
    pub fn unused(&self, at: ScopeId) -> Vec<(String, Span)> {
        self.scopes[at.0]
            .variables
            .iter()
            .filter(|(_, v)| !v.is_used())
            .map(|(name, v)| (name.clone(), v.declared_at))
            .collect()
    }

    /// Attach a method to the type alias bound under `alias_name`. Methods
    /// live on the alias itself, not in the lexical scope, so trait
    /// conformance sees them wherever the alias is visible.
    pub fn register_method(
        &mut self,
        at: ScopeId,
        alias_name: &str,
        method_name: &str,
        signature: ExpressionType,
    ) -> bool {
        let Some(variable) = self.find_mut(at, alias_name) else {
            return false;
        };
        if let ExpressionType::Type(inner) = &mut variable.typing {
            if let ExpressionType::Alias(alias) = inner.as_mut() {
                alias.register_method(method_name, signature);
                return true;
            }
        }
        false
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
