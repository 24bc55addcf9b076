use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

/// Interned identifier. Only meaningful inside the table that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sym(DefaultSymbol);

pub struct SymbolTable {
    interner: StringInterner<DefaultBackend>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { interner: StringInterner::new() }
    }

    pub fn intern(&mut self, name: &str) -> Sym {
        Sym(self.interner.get_or_intern(name))
    }

    pub fn get(&self, name: &str) -> Option<Sym> {
        self.interner.get(name).map(Sym)
    }

    pub fn name(&self, sym: Sym) -> &str {
        self.interner.resolve(sym.0).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
