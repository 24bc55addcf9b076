use std::rc::Rc;

use tracing::debug;

use crate::ast::{Form, FormCursor};
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::op::Op;

/// Receives the macro's own id form; the cursor is already past it.
pub type MacroFn = Rc<dyn Fn(&mut Interpreter, &Form, &mut FormCursor<'_>) -> Result<()>>;

/// Compile-time strategy bound to an identifier.
#[derive(Clone)]
pub enum Macro {
    /// Emit exactly this op.
    Emit(Op),
    /// Consume any number of following forms and emit arbitrary ops.
    Expand(MacroFn),
}

impl std::fmt::Debug for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Macro::Emit(op) => write!(f, "Emit({})", op.name()),
            Macro::Expand(_) => write!(f, "Expand"),
        }
    }
}

impl Interpreter {
    pub fn register_macro<F>(&mut self, name: &str, imp: F) -> Result<()>
    where
        F: Fn(&mut Interpreter, &Form, &mut FormCursor<'_>) -> Result<()> + 'static,
    {
        self.add_macro(name, Macro::Expand(Rc::new(imp)))
    }

    /// Shorthand for a macro that emits one fixed op.
    pub fn register_op_macro(&mut self, name: &str, op: Op) -> Result<()> {
        self.add_macro(name, Macro::Emit(op))
    }

    fn add_macro(&mut self, name: &str, m: Macro) -> Result<()> {
        let id = self.syms.intern(name);
        if self.macros.contains_key(&id) {
            return Err(Error::Redefinition { name: name.to_string() });
        }
        debug!(name, kind = ?m, "registered macro");
        self.macros.insert(id, m);
        Ok(())
    }

    pub fn is_macro(&self, name: &str) -> bool {
        self.syms.get(name).is_some_and(|s| self.macros.contains_key(&s))
    }
}
