use crate::ast::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Identifier,
    Type,
    Variable,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKind::Identifier => write!(f, "identifier"),
            LookupKind::Type => write!(f, "type"),
            LookupKind::Variable => write!(f, "variable"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("syntax error at {pos}: {message}")]
    Syntax { pos: Pos, message: String },
    #[error("unknown {kind} at {pos}: {name}")]
    Lookup { pos: Pos, kind: LookupKind, name: String },
    #[error("dispatch failed at {pos}: {message}")]
    Dispatch { pos: Pos, message: String },
    #[error(
        "vm integrity violated by {fimp} at {pos}: expected stack depth {expected}, found {actual}"
    )]
    Integrity { pos: Pos, fimp: String, expected: usize, actual: usize },
    #[error("stack underflow at {pos} in {op}")]
    Underflow { pos: Pos, op: &'static str },
    #[error("already defined: {name}")]
    Redefinition { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn syntax(pos: Pos, message: impl Into<String>) -> Self {
        Error::Syntax { pos, message: message.into() }
    }

    pub fn lookup(pos: Pos, kind: LookupKind, name: impl Into<String>) -> Self {
        Error::Lookup { pos, kind, name: name.into() }
    }

    pub fn dispatch(pos: Pos, message: impl Into<String>) -> Self {
        Error::Dispatch { pos, message: message.into() }
    }

    /// Stable short code, used by diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Syntax { .. } => "syntax",
            Error::Lookup { .. } => "lookup",
            Error::Dispatch { .. } => "dispatch",
            Error::Integrity { .. } => "integrity",
            Error::Underflow { .. } => "underflow",
            Error::Redefinition { .. } => "redefinition",
        }
    }

    pub fn pos(&self) -> Option<Pos> {
        let pos = match self {
            Error::Syntax { pos, .. }
            | Error::Lookup { pos, .. }
            | Error::Dispatch { pos, .. }
            | Error::Integrity { pos, .. }
            | Error::Underflow { pos, .. } => *pos,
            Error::Redefinition { .. } => return None,
        };
        (pos != Pos::UNKNOWN).then_some(pos)
    }

    /// A broken native implementation; the embedding driver must not resume after it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Integrity { .. })
    }
}
