pub mod ansi;
pub mod json;
pub mod registry;

use crate::ast::Pos;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Label {
    pub pos: Pos,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<&'static str>,
    pub message: String,
    pub label: Option<Label>,
    pub notes: Vec<String>,
    pub suggestion: Option<String>,
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            label: None,
            notes: Vec::new(),
            suggestion: None,
            source: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Warning, ..Diagnostic::error(message) }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_pos(mut self, pos: Pos, label: impl Into<String>) -> Self {
        self.label = Some(Label { pos, message: label.into() });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl From<&Error> for Diagnostic {
    fn from(e: &Error) -> Self {
        let message = match e {
            Error::Syntax { message, .. } | Error::Dispatch { message, .. } => message.clone(),
            Error::Lookup { kind, name, .. } => format!("unknown {kind}: {name}"),
            Error::Integrity { fimp, expected, actual, .. } => {
                format!("{fimp} left the stack at depth {actual}, expected {expected}")
            }
            Error::Underflow { op, .. } => format!("stack underflow in {op}"),
            Error::Redefinition { name } => format!("already defined: {name}"),
        };
        let mut d = Diagnostic::error(message).with_code(e.code());
        if let Some(pos) = e.pos() {
            d = d.with_pos(pos, "here");
        }
        if e.is_fatal() {
            d = d.with_note("the interpreter state is no longer trustworthy; discard it");
        }
        if let Some(hint) = registry::lookup(e.code()).and_then(|entry| entry.hint) {
            d = d.with_suggestion(hint);
        }
        d
    }
}
