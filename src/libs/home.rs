//! Baseline library: the core type lattice, control macros and integer/float arithmetic.

use crate::ast::{Form, FormCursor, FormKind};
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::op::Op;
use crate::types::TypeId;
use crate::value::{Payload, Value};

pub fn install(it: &mut Interpreter) -> Result<()> {
    let maybe = it.register_type("Maybe", &[])?;
    let nil = it.register_type("Nil", &[maybe])?;
    let a = it.register_type("A", &[maybe])?;
    let num = it.register_type("Num", &[a])?;
    let boolean = it.register_type("Bool", &[a])?;
    let float = it.register_type("Float", &[num])?;
    let int = it.register_type("Int", &[num])?;
    it.register_type("Str", &[a])?;
    let lambda = it.register_type("Lambda", &[a])?;

    it.register_op_macro("t", Op::Push(Value::boolean(boolean, true)))?;
    it.register_op_macro("f", Op::Push(Value::boolean(boolean, false)))?;
    it.register_op_macro("nil", Op::Push(Value::new(nil, Payload::Nil)))?;
    it.register_macro("_", |_, _, _| Ok(()))?;

    it.register_op_macro("call", Op::Call)?;
    it.register_op_macro("drop", Op::Drop)?;
    it.register_op_macro("dup", Op::Dup)?;
    it.register_op_macro("swap", Op::Swap)?;

    it.register_macro("let:", let_macro)?;
    it.register_macro("if:", if_macro)?;
    it.register_macro("func:", func_macro)?;
    it.register_macro("lambda:", move |it, form, cursor| lambda_macro(it, form, cursor, lambda))?;

    let any = Value::undef(maybe);
    it.register_fimp("=", vec![any.clone(), any.clone()], vec![boolean], move |it| {
        let y = it.pop()?;
        let x = it.pop()?;
        it.push(Value::boolean(boolean, x.eqval(&y)));
        Ok(())
    })?;
    it.register_fimp("==", vec![any.clone(), any.clone()], vec![boolean], move |it| {
        let y = it.pop()?;
        let x = it.pop()?;
        it.push(Value::boolean(boolean, x.is(&y)));
        Ok(())
    })?;
    it.register_fimp("bool", vec![any.clone()], vec![boolean], move |it| {
        let v = it.pop()?;
        it.push(Value::boolean(boolean, v.is_true()));
        Ok(())
    })?;
    it.register_fimp("not", vec![any], vec![boolean], move |it| {
        let v = it.pop()?;
        it.push(Value::boolean(boolean, !v.is_true()));
        Ok(())
    })?;

    let ints = vec![Value::undef(int), Value::undef(int)];
    let floats = vec![Value::undef(float), Value::undef(float)];

    int_op(it, "+", int, &ints, i64::wrapping_add)?;
    int_op(it, "-", int, &ints, i64::wrapping_sub)?;
    int_op(it, "*", int, &ints, i64::wrapping_mul)?;
    float_op(it, "+", float, &floats, |x, y| x + y)?;
    float_op(it, "-", float, &floats, |x, y| x - y)?;
    float_op(it, "*", float, &floats, |x, y| x * y)?;

    let some = Value::undef(a);
    it.register_fimp("<", vec![some.clone(), some], vec![boolean], move |it| {
        let y = it.pop()?;
        let x = it.pop()?;
        let Some(lt) = x.less_than(&y) else {
            let msg = format!("cannot compare {} with {}", it.render(&x), it.render(&y));
            return Err(Error::dispatch(it.current_pos(), msg));
        };
        it.push(Value::boolean(boolean, lt));
        Ok(())
    })?;

    it.register_fimp("int", vec![Value::undef(float)], vec![int], move |it| {
        let v = pop_float(it)?;
        it.push(Value::int(int, v as i64));
        Ok(())
    })?;
    it.register_fimp("float", vec![Value::undef(int)], vec![float], move |it| {
        let v = pop_int(it)?;
        it.push(Value::float(float, v as f64));
        Ok(())
    })?;

    Ok(())
}

// ---- Natives ----

fn pop_int(it: &mut Interpreter) -> Result<i64> {
    let v = it.pop()?;
    v.as_int().ok_or_else(|| mismatch(it, "Int", &v))
}

fn pop_float(it: &mut Interpreter) -> Result<f64> {
    let v = it.pop()?;
    v.as_float().ok_or_else(|| mismatch(it, "Float", &v))
}

fn mismatch(it: &Interpreter, expected: &str, got: &Value) -> Error {
    Error::dispatch(it.current_pos(), format!("expected {expected}, got {}", it.render(got)))
}

fn int_op(
    it: &mut Interpreter,
    name: &str,
    int: TypeId,
    args: &[Value],
    op: fn(i64, i64) -> i64,
) -> Result<()> {
    it.register_fimp(name, args.to_vec(), vec![int], move |it| {
        let y = pop_int(it)?;
        let x = pop_int(it)?;
        it.push(Value::int(int, op(x, y)));
        Ok(())
    })?;
    Ok(())
}

fn float_op(
    it: &mut Interpreter,
    name: &str,
    float: TypeId,
    args: &[Value],
    op: fn(f64, f64) -> f64,
) -> Result<()> {
    it.register_fimp(name, args.to_vec(), vec![float], move |it| {
        let y = pop_float(it)?;
        let x = pop_float(it)?;
        it.push(Value::float(float, op(x, y)));
        Ok(())
    })?;
    Ok(())
}

// ---- Macros ----

fn compile_required(
    it: &mut Interpreter,
    form: &Form,
    cursor: &mut FormCursor<'_>,
    what: &str,
) -> Result<()> {
    if cursor.is_done() {
        let name = form.dump(it.symbols());
        return Err(Error::syntax(form.pos, format!("{name} is missing its {what}")));
    }
    it.compile_next(cursor)
}

fn invalid(form: &Form, what: &str) -> Error {
    Error::syntax(form.pos, format!("invalid {what}: {}", form.kind_name()))
}

/// `let: name value` binds the value in the current scope. Without a value form, binds the
/// top of the stack.
fn let_macro(it: &mut Interpreter, form: &Form, cursor: &mut FormCursor<'_>) -> Result<()> {
    let place = cursor
        .next()
        .ok_or_else(|| Error::syntax(form.pos, "let: is missing its place"))?;
    let id = place
        .as_id()
        .ok_or_else(|| invalid(place, "let: place"))?;
    if !cursor.is_done() {
        it.compile_next(cursor)?;
    }
    it.emit(Op::PutVar(id), form.pos);
    Ok(())
}

/// `if: cond then else`
fn if_macro(it: &mut Interpreter, form: &Form, cursor: &mut FormCursor<'_>) -> Result<()> {
    compile_required(it, form, cursor, "condition")?;
    let else_jump = it.emit(Op::Else(0), form.pos);
    compile_required(it, form, cursor, "then branch")?;
    let skip = it.emit(Op::Skip(0), form.pos);
    it.patch_jump(else_jump);
    compile_required(it, form, cursor, "else branch")?;
    it.patch_jump(skip);
    Ok(())
}

/// `func: name <Args> Ret body` where `Ret` is a type or a type list.
fn func_macro(it: &mut Interpreter, form: &Form, cursor: &mut FormCursor<'_>) -> Result<()> {
    let missing = |what: &str| Error::syntax(form.pos, format!("func: is missing its {what}"));

    let name_form = cursor.next().ok_or_else(|| missing("name"))?;
    let name = name_form
        .as_id()
        .ok_or_else(|| invalid(name_form, "func name"))?;

    let args_form = cursor.next().ok_or_else(|| missing("args"))?;
    let args = match &args_form.kind {
        FormKind::TypeList(ids) => ids
            .iter()
            .map(|&t| it.lookup_type(t, args_form.pos).map(Value::undef))
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(invalid(args_form, "func args")),
    };

    let rets_form = cursor.next().ok_or_else(|| missing("rets"))?;
    let rets = match &rets_form.kind {
        FormKind::Id(t) => vec![it.lookup_type(*t, rets_form.pos)?],
        FormKind::TypeList(ids) => ids
            .iter()
            .map(|&t| it.lookup_type(t, rets_form.pos))
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(invalid(rets_form, "func rets")),
    };

    let body = cursor.next().ok_or_else(|| missing("body"))?;
    let forms = match &body.kind {
        FormKind::Sexpr(forms) => forms.clone(),
        _ => vec![body.clone()],
    };

    let fimp = it.register_forms_fimp(name, args, rets, forms, form.pos)?;
    it.compile_fimp(fimp, form.pos)?;
    Ok(())
}

/// `lambda: body` pushes a closure over the current scope.
fn lambda_macro(
    it: &mut Interpreter,
    form: &Form,
    cursor: &mut FormCursor<'_>,
    ty: TypeId,
) -> Result<()> {
    let at = it.emit(Op::Lambda { ty, nops: 0 }, form.pos);
    it.emit(Op::Begin, form.pos);
    compile_required(it, form, cursor, "body")?;
    it.emit(Op::End, form.pos);
    it.emit(Op::Return, form.pos);
    it.patch_jump(at);
    Ok(())
}
