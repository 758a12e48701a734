use serde::{Serialize, Deserialize};

use crate::span::Span;

/// What kind of source construct a location was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocKind {
    /// An ordinary statement or expression.
    Regular,
    /// An explicit `return` statement in user source.
    Return,
    /// A synthesized return for falling off the end of a function.
    ImplicitReturn,
    /// Compiler-inserted scoped-resource release code.
    Cleanup,
}

/// A tagged source location: position, kind, and whether the code it
/// describes was synthesized by the compiler rather than written by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLoc {
    pub span: Span,
    pub kind: LocKind,
    pub auto_generated: bool,
}

impl SourceLoc {
    pub fn regular(span: Span) -> Self {
        Self { span, kind: LocKind::Regular, auto_generated: false }
    }

    /// Location of an explicit `return` statement.
    pub fn explicit_return(span: Span) -> Self {
        Self { span, kind: LocKind::Return, auto_generated: false }
    }

    /// Derive an implicit-return location from an existing one. Keeps the
    /// span and the auto-generated flag.
    pub fn implicit_return_from(loc: SourceLoc) -> Self {
        Self { kind: LocKind::ImplicitReturn, ..loc }
    }

    /// Derive a cleanup location from an existing one. Keeps the span and
    /// the auto-generated flag.
    pub fn cleanup_from(loc: SourceLoc) -> Self {
        Self { kind: LocKind::Cleanup, ..loc }
    }

    /// Mark this location as compiler-synthesized. Diagnostics downstream
    /// stay silent about code attributed to auto-generated locations.
    pub fn mark_auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    pub fn is_explicit_return(&self) -> bool {
        self.kind == LocKind::Return
    }
}
