use std::rc::Rc;

use tracing::{error, trace};

use crate::error::{Error, LookupKind, Result};
use crate::func::{FimpBody, FimpId};
use crate::interp::Interpreter;
use crate::op::Op;
use crate::scope::{Call, CallTarget, Scope};
use crate::value::{Lambda, Payload, Value};

impl Interpreter {
    /// Executes from the current pc to the end of the op sequence.
    ///
    /// Any error abandons the run: the call stack is cleared, scopes return to the root and
    /// the pc moves past the last op. The operand stack is left as the failing op found it.
    pub fn run(&mut self) -> Result<()> {
        while self.pc < self.ops.len() {
            if let Err(e) = self.step() {
                self.calls.clear();
                self.scopes.truncate(1);
                self.pc = self.ops.len();
                return Err(e);
            }
        }
        Ok(())
    }

    fn scope(&self) -> &Rc<Scope> {
        self.scopes.last().unwrap_or(&self.root)
    }

    fn pop_for(&mut self, op: &'static str) -> Result<Value> {
        let pos = self.current_pos();
        self.stack.pop().ok_or(Error::Underflow { pos, op })
    }

    /// Parent for the scope a body opens at `Begin`, or `None` if it runs in the caller's.
    fn body_scope_parent(&self) -> Option<Rc<Scope>> {
        match &self.calls.last()?.target {
            CallTarget::Fimp(f) => {
                let fimp = &self.fimps[f.0];
                fimp.flags
                    .vars
                    .then(|| fimp.parent_scope.clone().unwrap_or_else(|| self.root.clone()))
            }
            CallTarget::Lambda(l) => Some(l.scope.clone()),
        }
    }

    fn body_is_scoped(&self) -> bool {
        match self.calls.last().map(|c| &c.target) {
            Some(CallTarget::Fimp(f)) => self.fimps[f.0].flags.vars,
            Some(CallTarget::Lambda(_)) => true,
            None => false,
        }
    }

    fn step(&mut self) -> Result<()> {
        let op = self.ops[self.pc].clone();
        if self.options.trace {
            trace!(
                pc = self.pc,
                op = op.name(),
                depth = self.stack.len(),
                calls = self.calls.len(),
                "step"
            );
        }

        match op {
            Op::Push(v) => {
                self.stack.push(v);
                self.pc += 1;
            }
            Op::GetVar(id) => {
                let v = self.scope().get(id).ok_or_else(|| {
                    Error::lookup(self.current_pos(), LookupKind::Variable, self.syms.name(id))
                })?;
                self.stack.push(v);
                self.pc += 1;
            }
            Op::PutVar(id) => {
                let v = self.pop_for("PutVar")?;
                self.scope().put(id, v);
                self.pc += 1;
            }
            Op::Funcall(fimp) => self.call_fimp(fimp)?,
            Op::Dispatch(func) => {
                let fimp = self.best_fimp(func, &self.stack)?;
                self.call_fimp(fimp)?;
            }
            Op::Begin => {
                if let Some(parent) = self.body_scope_parent() {
                    self.scopes.push(Scope::child(&parent));
                }
                let scope = self.scope().clone();
                if let Some(call) = self.calls.last_mut() {
                    call.scope = scope;
                }
                self.pc += 1;
            }
            Op::End => {
                if self.body_is_scoped() && self.scopes.len() > 1 {
                    self.scopes.pop();
                }
                self.pc += 1;
            }
            Op::Else(n) => {
                let cond = self.pop_for("Else")?;
                self.pc += if cond.is_true() { 1 } else { 1 + n };
            }
            Op::Skip(n) => self.pc += 1 + n,
            Op::Return => {
                let pos = self.current_pos();
                let call = self.calls.pop().ok_or(Error::Underflow { pos, op: "Return" })?;
                self.pc = call.return_pc.ok_or(Error::Underflow { pos, op: "Return" })?;
            }
            Op::Drop => {
                self.pop_for("Drop")?;
                self.pc += 1;
            }
            Op::Dup => {
                let pos = self.current_pos();
                let v = self.stack.last().cloned().ok_or(Error::Underflow { pos, op: "Dup" })?;
                self.stack.push(v);
                self.pc += 1;
            }
            Op::Swap => {
                let n = self.stack.len();
                if n < 2 {
                    return Err(Error::Underflow { pos: self.current_pos(), op: "Swap" });
                }
                self.stack.swap(n - 1, n - 2);
                self.pc += 1;
            }
            Op::Call => {
                let target = self.pop_for("Call")?;
                let Some(lambda) = target.as_lambda().cloned() else {
                    let msg = format!("not callable: {}", self.render(&target));
                    return Err(Error::dispatch(self.current_pos(), msg));
                };
                let scope = self.scope().clone();
                let (start, return_pc) = (lambda.start, Some(self.pc + 1));
                self.calls.push(Call { target: CallTarget::Lambda(lambda), scope, return_pc });
                self.pc = start;
            }
            Op::Fimp { fimp, nops } => {
                self.fimps[fimp.0].parent_scope = Some(self.scope().clone());
                self.pc += 1 + nops;
            }
            Op::Lambda { ty, nops } => {
                let lambda = Lambda { start: self.pc + 1, nops, scope: self.scope().clone() };
                self.stack.push(Value::new(ty, Payload::Lambda(Rc::new(lambda))));
                self.pc += 1 + nops;
            }
        }
        Ok(())
    }

    fn call_fimp(&mut self, id: FimpId) -> Result<()> {
        let pos = self.current_pos();
        let scope = self.scope().clone();

        match self.fimps[id.0].body.clone() {
            FimpBody::Native(imp) => {
                let func = &self.funcs[self.fimps[id.0].func.0];
                let (nargs, nrets) = (func.nargs, func.nrets);
                let before = self.stack.len();
                if before < nargs {
                    return Err(Error::Underflow { pos, op: "Funcall" });
                }

                let base = before - nargs;
                let args = self.stack[base..].to_vec();

                self.calls.push(Call { target: CallTarget::Fimp(id), scope, return_pc: None });
                let result = imp(self);
                self.calls.pop();
                if let Err(e) = result {
                    // a failed native leaves its arguments where it found them
                    if self.stack.len() >= base {
                        self.stack.truncate(base);
                        self.stack.extend(args);
                    }
                    return Err(e);
                }

                let expected = before - nargs + nrets;
                let actual = self.stack.len();
                if actual != expected {
                    let fimp = self.fimp_name(id).to_string();
                    error!(fimp = %fimp, expected, actual, "native broke its declared arity");
                    return Err(Error::Integrity { pos, fimp, expected, actual });
                }
                self.pc += 1;
            }
            FimpBody::Forms(_) => {
                self.compile_fimp(id, pos)?;
                let start = self.fimps[id.0].start().ok_or_else(|| {
                    Error::syntax(pos, format!("{} has no compiled body", self.fimp_name(id)))
                })?;
                let return_pc = Some(self.pc + 1);
                self.calls.push(Call { target: CallTarget::Fimp(id), scope, return_pc });
                self.pc = start;
            }
        }
        Ok(())
    }

    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }
}
