use std::rc::Rc;

use crate::ast::Form;
use crate::error::Result;
use crate::interp::Interpreter;
use crate::scope::Scope;
use crate::sym::Sym;
use crate::types::TypeId;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FimpId(pub(crate) usize);

/// Generic function: fixed arity, open set of implementations.
#[derive(Debug)]
pub struct Func {
    pub id: Sym,
    pub nargs: usize,
    pub nrets: usize,
    /// Registration order; dispatch ties go to the earliest.
    pub fimps: Vec<FimpId>,
}

pub type NativeFn = Rc<dyn Fn(&mut Interpreter) -> Result<()>>;

#[derive(Clone)]
pub enum FimpBody {
    Native(NativeFn),
    Forms(Rc<[Form]>),
}

impl std::fmt::Debug for FimpBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FimpBody::Native(_) => write!(f, "Native"),
            FimpBody::Forms(forms) => write!(f, "Forms({})", forms.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileState {
    Uncompiled,
    /// `start` indexes the body's `Begin`; `len` runs through its `Return`.
    Compiled { start: usize, len: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FimpFlags {
    /// Body reads or writes variables, so calls get their own scope.
    pub vars: bool,
    /// Body calls back into its own Func.
    pub recalls: bool,
}

/// One implementation of a [`Func`] for a specific argument pattern.
#[derive(Debug)]
pub struct Fimp {
    pub id: Sym,
    pub func: FuncId,
    pub args: Vec<Value>,
    pub rets: Vec<TypeId>,
    pub body: FimpBody,
    pub state: CompileState,
    pub flags: FimpFlags,
    pub(crate) parent_scope: Option<Rc<Scope>>,
}

impl Fimp {
    pub fn is_native(&self) -> bool {
        matches!(self.body, FimpBody::Native(_))
    }

    pub fn start(&self) -> Option<usize> {
        match self.state {
            CompileState::Compiled { start, .. } => Some(start),
            CompileState::Uncompiled => None,
        }
    }

    pub fn len(&self) -> usize {
        match self.state {
            CompileState::Compiled { len, .. } => len,
            CompileState::Uncompiled => 0,
        }
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, CompileState::Compiled { .. })
    }

    pub(crate) fn reset(&mut self) {
        self.state = CompileState::Uncompiled;
        self.flags = FimpFlags::default();
        self.parent_scope = None;
    }
}
