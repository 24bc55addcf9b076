use serde::Serialize;

use crate::sym::{Sym, SymbolTable};
use crate::value::Value;

// ---- Positions ----

/// 1-based source position, as supplied by whatever reader built the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub const UNKNOWN: Pos = Pos { line: 0, col: 0 };

    pub fn new(line: usize, col: usize) -> Self {
        Pos { line, col }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ---- Forms ----

#[derive(Debug, Clone)]
pub enum FormKind {
    /// Identifier: variable read (`@x`), macro, or function name
    Id(Sym),
    Literal(Value),
    /// `( ... )`, compiled inline with no scope of its own
    Sexpr(Vec<Form>),
    /// `<T1 T2>`, only valid right after a function name or inside a declaration
    TypeList(Vec<Sym>),
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub pos: Pos,
}

impl Form {
    pub fn id(sym: Sym) -> Self {
        Form { kind: FormKind::Id(sym), pos: Pos::UNKNOWN }
    }

    pub fn literal(value: Value) -> Self {
        Form { kind: FormKind::Literal(value), pos: Pos::UNKNOWN }
    }

    pub fn sexpr(body: Vec<Form>) -> Self {
        Form { kind: FormKind::Sexpr(body), pos: Pos::UNKNOWN }
    }

    pub fn type_list(ids: Vec<Sym>) -> Self {
        Form { kind: FormKind::TypeList(ids), pos: Pos::UNKNOWN }
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            FormKind::Id(_) => "Id",
            FormKind::Literal(_) => "Literal",
            FormKind::Sexpr(_) => "Sexpr",
            FormKind::TypeList(_) => "TypeList",
        }
    }

    pub fn as_id(&self) -> Option<Sym> {
        match self.kind {
            FormKind::Id(s) => Some(s),
            _ => None,
        }
    }

    /// Literals render without type names; use for diagnostics only.
    pub fn dump(&self, syms: &SymbolTable) -> String {
        match &self.kind {
            FormKind::Id(s) => syms.name(*s).to_string(),
            FormKind::Literal(v) => v.render("?"),
            FormKind::Sexpr(body) => {
                let inner: Vec<String> = body.iter().map(|f| f.dump(syms)).collect();
                format!("({})", inner.join(" "))
            }
            FormKind::TypeList(ids) => {
                let inner: Vec<&str> = ids.iter().map(|s| syms.name(*s)).collect();
                format!("<{}>", inner.join(" "))
            }
        }
    }
}

// ---- Cursor ----

/// Read position into a form slice. Macros advance it past whatever they consume.
pub struct FormCursor<'a> {
    forms: &'a [Form],
    at: usize,
}

impl<'a> FormCursor<'a> {
    pub fn new(forms: &'a [Form]) -> Self {
        FormCursor { forms, at: 0 }
    }

    pub fn peek(&self) -> Option<&'a Form> {
        self.forms.get(self.at)
    }

    pub fn next(&mut self) -> Option<&'a Form> {
        let form = self.forms.get(self.at);
        if form.is_some() {
            self.at += 1;
        }
        form
    }

    pub fn is_done(&self) -> bool {
        self.at >= self.forms.len()
    }

    pub fn remaining(&self) -> usize {
        self.forms.len().saturating_sub(self.at)
    }

    pub fn pos(&self) -> usize {
        self.at
    }
}
