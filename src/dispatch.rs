use tracing::trace;

use crate::ast::Pos;
use crate::error::{Error, Result};
use crate::func::{FimpId, FuncId};
use crate::interp::Interpreter;
use crate::types::{TypeId, TypeRegistry};
use crate::value::Value;

/// Distance between an argument pattern and the top of the stack, or `None` if it doesn't match.
///
/// Each position whose pattern isn't the wildcard adds the tag distance between the value's
/// type and the pattern's type, so an exact type match adds nothing and implementations
/// declared closer to the runtime type in registration order score lower.
pub fn score(types: &TypeRegistry, args: &[Value], stack: &[Value]) -> Option<u64> {
    if args.is_empty() {
        return Some(0);
    }
    if stack.len() < args.len() {
        return None;
    }
    let wildcard = types.wildcard();
    let mut score = 0;
    for (value, pattern) in stack[stack.len() - args.len()..].iter().zip(args) {
        if pattern.ty == wildcard || value.ty == wildcard {
            continue;
        }
        if pattern.is_defined() {
            if !value.eqval(pattern) {
                return None;
            }
        } else if !types.isa(value.ty, pattern.ty) {
            return None;
        }
        score += types.tag(value.ty).abs_diff(types.tag(pattern.ty));
    }
    Some(score)
}

impl Interpreter {
    /// Lowest-scoring implementation; ties go to the first registered.
    fn select(&self, func: FuncId, stack: &[Value]) -> Option<FimpId> {
        let mut best: Option<(FimpId, u64)> = None;
        for &fimp in &self.funcs[func.0].fimps {
            let Some(s) = score(&self.types, &self.fimps[fimp.0].args, stack) else {
                continue;
            };
            if best.is_none_or(|(_, b)| s < b) {
                best = Some((fimp, s));
            }
        }
        if let Some((fimp, s)) = best {
            trace!(func = self.func_name(func), fimp = self.fimp_name(fimp), score = s, "dispatch");
        }
        best.map(|(fimp, _)| fimp)
    }

    pub fn best_fimp(&self, func: FuncId, stack: &[Value]) -> Result<FimpId> {
        self.select(func, stack)
            .ok_or_else(|| self.no_match(func, stack, self.current_pos()))
    }

    /// Compile-time resolution against type annotations instead of live values.
    pub fn best_fimp_for_types(&self, func: FuncId, types: &[TypeId], pos: Pos) -> Result<FimpId> {
        let stack: Vec<Value> = types.iter().map(|&t| Value::undef(t)).collect();
        self.select(func, &stack).ok_or_else(|| self.no_match(func, &stack, pos))
    }

    fn no_match(&self, func: FuncId, stack: &[Value], pos: Pos) -> Error {
        let nargs = self.funcs[func.0].nargs;
        let args: Vec<&str> = stack[stack.len().saturating_sub(nargs)..]
            .iter()
            .map(|v| self.type_name(v.ty))
            .collect();
        Error::dispatch(
            pos,
            format!("no implementation of {} matches <{}>", self.func_name(func), args.join(" ")),
        )
    }
}
