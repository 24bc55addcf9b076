use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::func::FimpId;
use crate::sym::Sym;
use crate::value::{Lambda, Value};

/// Lexical binding frame. The parent is fixed at creation.
#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<Rc<Scope>>,
    vars: RefCell<HashMap<Sym, Value>>,
}

impl Scope {
    pub fn root() -> Rc<Self> {
        Rc::new(Scope::default())
    }

    pub fn child(parent: &Rc<Scope>) -> Rc<Self> {
        Rc::new(Scope { parent: Some(parent.clone()), vars: RefCell::new(HashMap::new()) })
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    pub fn get(&self, id: Sym) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(v) = scope.vars.borrow().get(&id) {
                return Some(v.clone());
            }
            scope = scope.parent.as_deref()?;
        }
    }

    /// Binds in this scope only, shadowing any outer binding.
    pub fn put(&self, id: Sym, value: Value) {
        self.vars.borrow_mut().insert(id, value);
    }

    pub fn len(&self) -> usize {
        self.vars.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.borrow().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum CallTarget {
    Fimp(FimpId),
    Lambda(Rc<Lambda>),
}

/// Activation record.
#[derive(Debug)]
pub struct Call {
    pub target: CallTarget,
    pub scope: Rc<Scope>,
    /// `None` for native calls, which never redirect the pc.
    pub return_pc: Option<usize>,
}
