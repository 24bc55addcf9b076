use std::collections::HashMap;

use tracing::debug;

use crate::sym::Sym;

/// Index into a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub id: Sym,
    pub parents: Vec<TypeId>,
    /// Registration order; only used as dispatch distance, never for subtyping.
    pub tag: u64,
}

/// Type lattice with multiple parents. Types are permanent once registered.
#[derive(Debug)]
pub struct TypeRegistry {
    nodes: Vec<TypeNode>,
    by_id: HashMap<Sym, TypeId>,
}

impl TypeRegistry {
    /// Creates a registry holding only the wildcard type, tagged 0.
    pub fn new(wildcard: Sym) -> Self {
        TypeRegistry {
            nodes: vec![TypeNode { id: wildcard, parents: Vec::new(), tag: 0 }],
            by_id: HashMap::from([(wildcard, TypeId(0))]),
        }
    }

    /// Assigns the next tag. Returns `None` if `id` is already taken.
    pub fn register(&mut self, id: Sym, parents: &[TypeId]) -> Option<TypeId> {
        if self.by_id.contains_key(&id) {
            return None;
        }
        let tag = self.nodes.last().map(|n| n.tag + 1).unwrap_or(0);
        let ty = TypeId(self.nodes.len());
        self.nodes.push(TypeNode { id, parents: parents.to_vec(), tag });
        self.by_id.insert(id, ty);
        debug!(ty = ty.0, tag, parents = parents.len(), "registered type");
        Some(ty)
    }

    pub fn wildcard(&self) -> TypeId {
        TypeId(0)
    }

    pub fn get(&self, id: Sym) -> Option<TypeId> {
        self.by_id.get(&id).copied()
    }

    pub fn node(&self, ty: TypeId) -> &TypeNode {
        &self.nodes[ty.0]
    }

    pub fn tag(&self, ty: TypeId) -> u64 {
        self.nodes[ty.0].tag
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reflexive-transitive reachability over parent edges. Everything isa the wildcard.
    pub fn isa(&self, ty: TypeId, parent: TypeId) -> bool {
        if ty == parent || parent == self.wildcard() {
            return true;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut todo = vec![ty];
        while let Some(t) = todo.pop() {
            for &p in &self.nodes[t.0].parents {
                if p == parent {
                    return true;
                }
                if !seen[p.0] {
                    seen[p.0] = true;
                    todo.push(p);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::SymbolTable;

    fn lattice() -> (SymbolTable, TypeRegistry, [TypeId; 5]) {
        let mut syms = SymbolTable::new();
        let mut reg = TypeRegistry::new(syms.intern("_"));
        let a = reg.register(syms.intern("A"), &[]).unwrap();
        let num = reg.register(syms.intern("Num"), &[a]).unwrap();
        let cmp = reg.register(syms.intern("Cmp"), &[a]).unwrap();
        let int = reg.register(syms.intern("Int"), &[num, cmp]).unwrap();
        let float = reg.register(syms.intern("Float"), &[num]).unwrap();
        (syms, reg, [a, num, cmp, int, float])
    }

    #[test]
    fn isa_follows_parents() {
        let (_, reg, [a, num, cmp, int, float]) = lattice();
        assert!(reg.isa(int, num));
        assert!(reg.isa(int, cmp));
        assert!(reg.isa(int, a));
        assert!(reg.isa(float, a));
        assert!(!reg.isa(float, cmp));
        assert!(!reg.isa(num, int));
        assert!(!reg.isa(int, float));
    }

    #[test]
    fn isa_is_reflexive() {
        let (_, reg, types) = lattice();
        for t in types {
            assert!(reg.isa(t, t));
        }
    }

    #[test]
    fn everything_isa_wildcard() {
        let (_, reg, types) = lattice();
        for t in types {
            assert!(reg.isa(t, reg.wildcard()));
        }
        assert!(!reg.isa(reg.wildcard(), types[0]));
    }

    #[test]
    fn tags_strictly_increase() {
        let (_, reg, types) = lattice();
        assert_eq!(reg.tag(reg.wildcard()), 0);
        for w in types.windows(2) {
            assert!(reg.tag(w[0]) < reg.tag(w[1]));
        }
    }

    #[test]
    fn duplicate_registration_fails() {
        let (mut syms, mut reg, _) = lattice();
        assert!(reg.register(syms.intern("Int"), &[]).is_none());
        assert_eq!(reg.len(), 6);
    }
}
