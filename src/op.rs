use crate::func::{FimpId, FuncId};
use crate::sym::Sym;
use crate::types::TypeId;
use crate::value::Value;

/// One bytecode instruction. Jump distances count ops after the jump itself:
/// a jump at `i` with distance `n` lands at `i + 1 + n`.
#[derive(Debug, Clone)]
pub enum Op {
    Push(Value),
    GetVar(Sym),
    /// Pops the top value and binds it in the current scope.
    PutVar(Sym),
    Funcall(FimpId),
    Dispatch(FuncId),
    Begin,
    End,
    /// Pops a condition; jumps when it is false.
    Else(usize),
    Skip(usize),
    Return,
    Drop,
    Dup,
    Swap,
    /// Pops a lambda and calls it.
    Call,
    /// Function body marker; straight-line flow skips the body.
    Fimp { fimp: FimpId, nops: usize },
    Lambda { ty: TypeId, nops: usize },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Push(_) => "Push",
            Op::GetVar(_) => "GetVar",
            Op::PutVar(_) => "PutVar",
            Op::Funcall(_) => "Funcall",
            Op::Dispatch(_) => "Dispatch",
            Op::Begin => "Begin",
            Op::End => "End",
            Op::Else(_) => "Else",
            Op::Skip(_) => "Skip",
            Op::Return => "Return",
            Op::Drop => "Drop",
            Op::Dup => "Dup",
            Op::Swap => "Swap",
            Op::Call => "Call",
            Op::Fimp { .. } => "Fimp",
            Op::Lambda { .. } => "Lambda",
        }
    }

    /// Mutable distance field, for ops emitted as forward-jump placeholders.
    pub(crate) fn distance_mut(&mut self) -> Option<&mut usize> {
        match self {
            Op::Else(n) | Op::Skip(n) => Some(n),
            Op::Fimp { nops, .. } | Op::Lambda { nops, .. } => Some(nops),
            _ => None,
        }
    }

    pub fn is_var_access(&self) -> bool {
        matches!(self, Op::GetVar(_) | Op::PutVar(_))
    }
}
