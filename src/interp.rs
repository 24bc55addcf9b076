use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::ast::{Form, Pos};
use crate::compiler::macros::Macro;
use crate::config::Options;
use crate::error::{Error, LookupKind, Result};
use crate::func::{CompileState, Fimp, FimpBody, FimpFlags, FimpId, Func, FuncId};
use crate::libs;
use crate::op::Op;
use crate::scope::{Call, Scope};
use crate::sym::{Sym, SymbolTable};
use crate::types::{TypeId, TypeRegistry};
use crate::value::Value;

/// One independent evaluation session. Owns every type, function, scope and op;
/// ids handed out by one instance mean nothing to another.
pub struct Interpreter {
    pub(crate) options: Options,
    pub(crate) syms: SymbolTable,
    pub(crate) types: TypeRegistry,
    pub(crate) funcs: Vec<Func>,
    pub(crate) func_ids: HashMap<Sym, FuncId>,
    pub(crate) fimps: Vec<Fimp>,
    pub(crate) fimp_ids: HashMap<Sym, FimpId>,
    pub(crate) macros: HashMap<Sym, Macro>,
    pub(crate) ops: Vec<Op>,
    pub(crate) op_pos: Vec<Pos>,
    pub(crate) stack: Vec<Value>,
    pub(crate) root: Rc<Scope>,
    pub(crate) scopes: Vec<Rc<Scope>>,
    pub(crate) calls: Vec<Call>,
    pub(crate) pc: usize,
    /// Fimps replaced inside the open transaction, oldest first.
    pub(crate) replaced: Vec<(FimpId, Fimp)>,
    pub(crate) txn_depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut syms = SymbolTable::new();
        let types = TypeRegistry::new(syms.intern("_"));
        let root = Scope::root();
        let mut interp = Interpreter {
            syms,
            types,
            funcs: Vec::new(),
            func_ids: HashMap::new(),
            fimps: Vec::new(),
            fimp_ids: HashMap::new(),
            macros: HashMap::new(),
            ops: Vec::new(),
            op_pos: Vec::new(),
            stack: Vec::with_capacity(options.stack_capacity),
            scopes: vec![root.clone()],
            root,
            calls: Vec::with_capacity(options.call_capacity),
            pc: 0,
            replaced: Vec::new(),
            txn_depth: 0,
            options,
        };
        if interp.options.home {
            libs::home::install(&mut interp)
                .expect("home library registers into a fresh interpreter");
        }
        interp
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // ── Symbols & types ─────────────────────────────────────────────

    pub fn sym(&mut self, name: &str) -> Sym {
        self.syms.intern(name)
    }

    pub fn name(&self, sym: Sym) -> &str {
        self.syms.name(sym)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.syms
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn register_type(&mut self, name: &str, parents: &[TypeId]) -> Result<TypeId> {
        let id = self.syms.intern(name);
        self.types
            .register(id, parents)
            .ok_or_else(|| Error::Redefinition { name: name.to_string() })
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.syms.get(name).and_then(|s| self.types.get(s))
    }

    pub fn type_name(&self, ty: TypeId) -> &str {
        self.syms.name(self.types.node(ty).id)
    }

    pub fn isa(&self, ty: TypeId, parent: TypeId) -> bool {
        self.types.isa(ty, parent)
    }

    pub(crate) fn lookup_type(&self, id: Sym, pos: Pos) -> Result<TypeId> {
        self.types
            .get(id)
            .ok_or_else(|| Error::lookup(pos, LookupKind::Type, self.syms.name(id)))
    }

    // ── Funcs & fimps ───────────────────────────────────────────────

    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.0]
    }

    pub fn fimp(&self, id: FimpId) -> &Fimp {
        &self.fimps[id.0]
    }

    pub fn func_id(&self, name: &str) -> Option<FuncId> {
        self.syms.get(name).and_then(|s| self.func_ids.get(&s).copied())
    }

    /// Looks up an implementation by its full id, e.g. `+<Int Int>`.
    pub fn fimp_id(&self, name: &str) -> Option<FimpId> {
        self.syms.get(name).and_then(|s| self.fimp_ids.get(&s).copied())
    }

    pub(crate) fn fimp_name(&self, id: FimpId) -> &str {
        self.syms.name(self.fimps[id.0].id)
    }

    pub(crate) fn func_name(&self, id: FuncId) -> &str {
        self.syms.name(self.funcs[id.0].id)
    }

    pub fn register_fimp<F>(
        &mut self,
        name: &str,
        args: Vec<Value>,
        rets: Vec<TypeId>,
        imp: F,
    ) -> Result<FimpId>
    where
        F: Fn(&mut Interpreter) -> Result<()> + 'static,
    {
        let id = self.syms.intern(name);
        self.add_fimp(id, args, rets, FimpBody::Native(Rc::new(imp)), Pos::UNKNOWN)
    }

    /// Registers an implementation whose body is compiled lazily from `forms`.
    pub fn register_forms_fimp(
        &mut self,
        id: Sym,
        args: Vec<Value>,
        rets: Vec<TypeId>,
        forms: Vec<Form>,
        pos: Pos,
    ) -> Result<FimpId> {
        self.add_fimp(id, args, rets, FimpBody::Forms(forms.into()), pos)
    }

    fn add_fimp(
        &mut self,
        id: Sym,
        args: Vec<Value>,
        rets: Vec<TypeId>,
        body: FimpBody,
        pos: Pos,
    ) -> Result<FimpId> {
        let func = match self.func_ids.get(&id) {
            Some(&f) => {
                let func = &self.funcs[f.0];
                if func.nargs != args.len() || func.nrets != rets.len() {
                    return Err(Error::syntax(
                        pos,
                        format!(
                            "{} takes {} args and returns {}, got {} and {}",
                            self.syms.name(id),
                            func.nargs,
                            func.nrets,
                            args.len(),
                            rets.len()
                        ),
                    ));
                }
                f
            }
            None => {
                let f = FuncId(self.funcs.len());
                let (nargs, nrets) = (args.len(), rets.len());
                self.funcs.push(Func { id, nargs, nrets, fimps: Vec::new() });
                self.func_ids.insert(id, f);
                f
            }
        };

        let fimp_sym = self.signature(id, &args);
        let fresh = Fimp {
            id: fimp_sym,
            func,
            args,
            rets,
            body,
            state: CompileState::Uncompiled,
            flags: FimpFlags::default(),
            parent_scope: None,
        };
        if let Some(&existing) = self.fimp_ids.get(&fimp_sym) {
            let old = std::mem::replace(&mut self.fimps[existing.0], fresh);
            if self.txn_depth > 0 {
                self.replaced.push((existing, old));
            }
            debug!(fimp = self.syms.name(fimp_sym), "redefined fimp");
            return Ok(existing);
        }

        let fimp = FimpId(self.fimps.len());
        self.fimps.push(fresh);
        self.fimp_ids.insert(fimp_sym, fimp);
        self.funcs[func.0].fimps.push(fimp);
        debug!(fimp = self.syms.name(fimp_sym), "registered fimp");
        Ok(fimp)
    }

    /// `name<T1 T2>`, literal patterns rendered as values.
    fn signature(&mut self, id: Sym, args: &[Value]) -> Sym {
        let parts: Vec<String> = args.iter().map(|a| self.render(a)).collect();
        let name = format!("{}<{}>", self.syms.name(id), parts.join(" "));
        self.syms.intern(&name)
    }

    // ── Operand stack ───────────────────────────────────────────────

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value> {
        let pos = self.current_pos();
        self.stack.pop().ok_or(Error::Underflow { pos, op: "pop" })
    }

    pub fn peek(&self) -> Option<&Value> {
        self.stack.last()
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Reads a variable from the root scope.
    pub fn var(&self, name: &str) -> Option<Value> {
        self.syms.get(name).and_then(|s| self.root.get(s))
    }

    pub fn render(&self, value: &Value) -> String {
        value.render(self.type_name(value.ty))
    }

    // ── Op sequence ─────────────────────────────────────────────────

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub(crate) fn current_pos(&self) -> Pos {
        self.op_pos.get(self.pc).copied().unwrap_or(Pos::UNKNOWN)
    }

    /// One line per op: index, tab, name, operands.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            out.push_str(&format!("{}\t{}", i, op.name()));
            let operand = match op {
                Op::Push(v) => Some(self.render(v)),
                Op::GetVar(s) | Op::PutVar(s) => Some(self.syms.name(*s).to_string()),
                Op::Funcall(f) => Some(self.fimp_name(*f).to_string()),
                Op::Dispatch(f) => Some(self.func_name(*f).to_string()),
                Op::Else(n) | Op::Skip(n) => Some(n.to_string()),
                Op::Lambda { nops, .. } => Some(format!("{}:{}", i + 1, nops)),
                Op::Fimp { fimp, nops } => Some(format!("{} {}", self.fimp_name(*fimp), nops)),
                Op::Begin | Op::End | Op::Return | Op::Drop | Op::Dup | Op::Swap | Op::Call => None,
            };
            if let Some(operand) = operand {
                out.push(' ');
                out.push_str(&operand);
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_has_only_wildcard() {
        let it = Interpreter::with_options(Options::bare());
        assert_eq!(it.types().len(), 1);
        assert_eq!(it.type_id("_"), Some(it.types().wildcard()));
        assert!(it.ops().is_empty());
    }

    #[test]
    fn register_type_twice_fails() {
        let mut it = Interpreter::with_options(Options::bare());
        it.register_type("T", &[]).unwrap();
        let err = it.register_type("T", &[]).unwrap_err();
        assert!(matches!(err, Error::Redefinition { ref name } if name == "T"));
    }

    #[test]
    fn fimp_ids_name_signature() {
        let mut it = Interpreter::with_options(Options::bare());
        let t = it.register_type("T", &[]).unwrap();
        let args = vec![Value::undef(t), Value::int(t, 3)];
        let f = it.register_fimp("g", args, vec![], |_| Ok(())).unwrap();
        assert_eq!(it.fimp_name(f), "g<T 3>");
        assert_eq!(it.fimp_id("g<T 3>"), Some(f));
    }

    #[test]
    fn arity_clash_is_syntax_error() {
        let mut it = Interpreter::with_options(Options::bare());
        let t = it.register_type("T", &[]).unwrap();
        it.register_fimp("g", vec![Value::undef(t)], vec![t], |_| Ok(())).unwrap();
        let args = vec![Value::undef(t), Value::undef(t)];
        let err = it.register_fimp("g", args, vec![t], |_| Ok(())).unwrap_err();
        assert_eq!(err.code(), "syntax");
    }

    #[test]
    fn same_signature_replaces() {
        let mut it = Interpreter::with_options(Options::bare());
        let t = it.register_type("T", &[]).unwrap();
        let a = it.register_fimp("g", vec![Value::undef(t)], vec![], |_| Ok(())).unwrap();
        let b = it.register_fimp("g", vec![Value::undef(t)], vec![], |_| Ok(())).unwrap();
        assert_eq!(a, b);
        assert_eq!(it.func(it.fimp(a).func).fimps.len(), 1);
    }

    #[test]
    fn pop_empty_underflows() {
        let mut it = Interpreter::with_options(Options::bare());
        assert_eq!(it.pop().unwrap_err().code(), "underflow");
    }
}
