pub mod macros;

use tracing::debug;

use crate::ast::{Form, FormCursor, FormKind, Pos};
use crate::error::{Error, LookupKind, Result};
use crate::func::{CompileState, FimpBody, FimpFlags, FimpId};
use crate::interp::Interpreter;
use crate::op::Op;
use crate::sym::Sym;
use macros::Macro;

// ── Emission ─────────────────────────────────────────────────────────

impl Interpreter {
    pub fn emit(&mut self, op: Op, pos: Pos) -> usize {
        let idx = self.ops.len();
        self.ops.push(op);
        self.op_pos.push(pos);
        idx
    }

    /// Points the placeholder at `at` to the current end of the op sequence.
    pub fn patch_jump(&mut self, at: usize) {
        let distance = self.ops.len() - at - 1;
        if let Some(n) = self.ops[at].distance_mut() {
            *n = distance;
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            ops: self.ops.len(),
            funcs: self.funcs.len(),
            fimps: self.fimps.len(),
            replaced: self.replaced.len(),
        }
    }

    /// Runs `f`, undoing every op and registration it made if it fails.
    pub(crate) fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.mark();
        self.txn_depth += 1;
        let result = f(self);
        self.txn_depth -= 1;
        match result {
            Ok(v) => {
                if self.txn_depth == 0 {
                    self.replaced.clear();
                }
                Ok(v)
            }
            Err(e) => {
                self.rollback(mark);
                Err(e)
            }
        }
    }

    /// Restores replaced fimps, forgets new funcs and fimps and drops ops past `mark`.
    /// Bodies compiled into the dropped range go back to uncompiled.
    fn rollback(&mut self, mark: Mark) {
        for (id, old) in self.replaced.drain(mark.replaced..).rev() {
            if id.0 < mark.fimps {
                self.fimps[id.0] = old;
            }
        }
        self.fimps.truncate(mark.fimps);
        self.funcs.truncate(mark.funcs);
        self.fimp_ids.retain(|_, f| f.0 < mark.fimps);
        self.func_ids.retain(|_, f| f.0 < mark.funcs);
        for func in &mut self.funcs {
            func.fimps.retain(|f| f.0 < mark.fimps);
        }

        self.ops.truncate(mark.ops);
        self.op_pos.truncate(mark.ops);
        for fimp in &mut self.fimps {
            if fimp.start().is_some_and(|start| start >= mark.ops) {
                fimp.reset();
            }
        }
    }
}

/// Registry and op lengths to return to on failure.
#[derive(Debug, Clone, Copy)]
struct Mark {
    ops: usize,
    funcs: usize,
    fimps: usize,
    replaced: usize,
}

// ── Forms ────────────────────────────────────────────────────────────

impl Interpreter {
    /// Compiles top-level forms, appending to the shared op sequence.
    /// A failing form leaves no ops or registrations behind; earlier forms stay compiled.
    pub fn compile(&mut self, forms: &[Form]) -> Result<()> {
        let mut cursor = FormCursor::new(forms);
        while !cursor.is_done() {
            self.transaction(|it| it.compile_next(&mut cursor))?;
        }
        Ok(())
    }

    /// Compiles a nested form sequence inline, without rollback.
    pub fn compile_inline(&mut self, forms: &[Form]) -> Result<()> {
        let mut cursor = FormCursor::new(forms);
        while !cursor.is_done() {
            self.compile_next(&mut cursor)?;
        }
        Ok(())
    }

    /// Compiles the form under the cursor plus whatever it consumes.
    pub fn compile_next(&mut self, cursor: &mut FormCursor<'_>) -> Result<()> {
        let Some(form) = cursor.next() else {
            return Ok(());
        };
        match &form.kind {
            FormKind::Literal(v) => {
                self.emit(Op::Push(v.clone()), form.pos);
            }
            FormKind::Sexpr(body) => self.compile_inline(body)?,
            FormKind::TypeList(_) => return Err(Error::syntax(form.pos, "stray type list")),
            FormKind::Id(id) => self.compile_id(*id, form, cursor)?,
        }
        Ok(())
    }

    fn compile_id(&mut self, id: Sym, form: &Form, cursor: &mut FormCursor<'_>) -> Result<()> {
        if let Some(var) = self.syms.name(id).strip_prefix('@') {
            let var = var.to_string();
            let var = self.syms.intern(&var);
            self.emit(Op::GetVar(var), form.pos);
            return Ok(());
        }

        if let Some(m) = self.macros.get(&id).cloned() {
            return match m {
                Macro::Emit(op) => {
                    self.emit(op, form.pos);
                    Ok(())
                }
                Macro::Expand(imp) => imp(self, form, cursor),
            };
        }

        let func = *self
            .func_ids
            .get(&id)
            .ok_or_else(|| Error::lookup(form.pos, LookupKind::Identifier, self.syms.name(id)))?;

        if self.funcs[func.0].nargs == 0 {
            // no arguments means a single possible signature
            let fimp = self.funcs[func.0].fimps[0];
            self.compile_fimp(fimp, form.pos)?;
            self.emit(Op::Funcall(fimp), form.pos);
            return Ok(());
        }

        if let Some(Form { kind: FormKind::TypeList(ids), pos }) = cursor.peek() {
            cursor.next();
            let types = ids
                .iter()
                .map(|&t| self.lookup_type(t, *pos))
                .collect::<Result<Vec<_>>>()?;
            let fimp = self.best_fimp_for_types(func, &types, form.pos)?;
            self.emit(Op::Funcall(fimp), form.pos);
        } else {
            self.emit(Op::Dispatch(func), form.pos);
        }
        Ok(())
    }
}

// ── Lazy body compilation ────────────────────────────────────────────

impl Interpreter {
    /// Emits `Fimp`, `Begin`, body, `End`, `Return` and patches the marker.
    /// Returns false if there was nothing to do.
    pub fn compile_fimp(&mut self, id: FimpId, pos: Pos) -> Result<bool> {
        let forms = match &self.fimps[id.0].body {
            FimpBody::Native(_) => return Ok(false),
            FimpBody::Forms(forms) => forms.clone(),
        };
        if self.fimps[id.0].is_compiled() {
            return Ok(false);
        }

        let (marker, start) = self.transaction(|it| {
            let marker = it.emit(Op::Fimp { fimp: id, nops: 0 }, pos);
            let start = it.emit(Op::Begin, pos);
            // compiled from here on, so recursive references don't recompile
            it.fimps[id.0].state = CompileState::Compiled { start, len: 0 };
            it.compile_inline(&forms)?;
            it.emit(Op::End, pos);
            it.emit(Op::Return, pos);
            Ok((marker, start))
        })?;

        let func = self.fimps[id.0].func;
        let body = &self.ops[start..];
        let flags = FimpFlags {
            vars: body.iter().any(Op::is_var_access),
            recalls: body.iter().any(|op| match op {
                Op::Funcall(f) => *f == id,
                Op::Dispatch(f) => *f == func,
                _ => false,
            }),
        };
        let len = body.len();

        let fimp = &mut self.fimps[id.0];
        fimp.state = CompileState::Compiled { start, len };
        fimp.flags = flags;
        self.patch_jump(marker);
        debug!(
            fimp = self.fimp_name(id),
            start,
            len,
            vars = flags.vars,
            recalls = flags.recalls,
            "compiled fimp"
        );
        Ok(true)
    }
}
