mod common;

use common::{eval, read};
use quill::diagnostic::{ansi::AnsiRenderer, json, Diagnostic};
use quill::{Error, Form, Interpreter, LookupKind, Op, Options, Pos, Value};

// --- End to end ---

#[test]
fn add_two_ints() {
    let mut it = Interpreter::new();
    assert_eq!(eval(&mut it, "2 3 +"), ["5"]);
    assert_eq!(it.pc(), it.ops().len());
}

#[test]
fn sessions_accumulate() {
    let mut it = Interpreter::new();
    eval(&mut it, "func: sq <Int> Int (dup *)");
    eval(&mut it, "4 sq");
    assert_eq!(eval(&mut it, "sq"), ["256"]);
}

#[test]
fn recursion_and_closures_together() {
    let mut it = Interpreter::new();
    let src = "
func: fact <Int> Int (if: (dup 2 <) () (dup 1 - fact *))
func: adder <Int> Lambda (let: n _ lambda: (@n +))
6 fact 5 adder call";
    assert_eq!(eval(&mut it, src), ["725"]);
    assert_eq!(it.call_depth(), 0);
    assert_eq!(it.scope_depth(), 1);
}

#[test]
fn redefinition_replaces_body() {
    let mut it = Interpreter::new();
    eval(&mut it, "func: g <Int> Int (1 +)");
    assert_eq!(eval(&mut it, "1 g"), ["2"]);
    it.clear_stack();
    eval(&mut it, "func: g <Int> Int (2 *)");
    assert_eq!(eval(&mut it, "5 g"), ["10"]);
}

// --- Errors ---

#[test]
fn dispatch_error_leaves_stack_alone() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "1.5 2 +");
    it.compile(&forms).unwrap();
    let err = it.run().unwrap_err();
    assert_eq!(err.code(), "dispatch");
    assert_eq!(err.pos(), Some(Pos::new(1, 7)));
    let stack: Vec<_> = it.stack().iter().map(|v| it.render(v)).collect();
    assert_eq!(stack, ["1.5", "2"]);
    assert_eq!(it.pc(), it.ops().len());
}

#[test]
fn interpreter_usable_after_error() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "@nope");
    it.compile(&forms).unwrap();
    assert!(it.run().is_err());
    assert_eq!(eval(&mut it, "1 2 +"), ["3"]);
}

#[test]
fn unknown_type_in_func_signature() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "func: h <Bogus> Int (1)");
    let err = it.compile(&forms).unwrap_err();
    assert!(matches!(err, Error::Lookup { .. }));
    assert!(it.func_id("h").is_none());
}

#[test]
fn failed_redefinition_keeps_old_body() {
    let mut it = Interpreter::new();
    eval(&mut it, "func: g <Int> Int (1 +)");
    let forms = read(&mut it, "func: g <Int> Int (bogus)");
    let err = it.compile(&forms).unwrap_err();
    assert!(matches!(err, Error::Lookup { kind: LookupKind::Identifier, .. }));
    assert_eq!(eval(&mut it, "1 g"), ["2"]);
}

#[test]
fn failed_definition_leaves_no_func() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "func: h <Int> Int (bogus)");
    assert!(it.compile(&forms).is_err());
    assert!(it.func_id("h").is_none());
    assert!(it.fimp_id("h<Int>").is_none());
    // arity is free again
    assert_eq!(eval(&mut it, "func: h <Int Int> Int (+)\n1 2 h"), ["3"]);
}

#[test]
fn fimp_cannot_see_callers_bindings() {
    let mut it = Interpreter::new();
    let src = "func: reader <Int> Int (@n +)\nfunc: caller <Int> Int (let: n 100 reader)\n1 caller";
    let forms = read(&mut it, src);
    it.compile(&forms).unwrap();
    let err = it.run().unwrap_err();
    match err {
        Error::Lookup { kind: LookupKind::Variable, ref name, .. } => assert_eq!(name, "n"),
        other => panic!("expected unbound n, got {other}"),
    }
    assert_eq!(it.call_depth(), 0);
    assert_eq!(it.scope_depth(), 1);
}

#[test]
fn arity_clash_is_rejected() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "func: + <Int> Int (1)");
    let err = it.compile(&forms).unwrap_err();
    assert_eq!(err.code(), "syntax");
}

fn misbehaving(pushes: usize) -> Error {
    let mut it = Interpreter::with_options(Options::bare());
    let t = it.register_type("T", &[]).unwrap();
    it.register_fimp("pair", vec![Value::undef(t), Value::undef(t)], vec![t], move |it| {
        it.pop()?;
        it.pop()?;
        for i in 0..pushes {
            it.push(Value::int(t, i as i64));
        }
        Ok(())
    })
    .unwrap();
    let pair = it.sym("pair");
    let forms = [
        Form::literal(Value::int(t, 0)),
        Form::literal(Value::int(t, 1)),
        Form::id(pair),
    ];
    it.compile(&forms).unwrap();
    it.run().unwrap_err()
}

#[test]
fn native_must_honor_declared_results() {
    for pushes in [0, 2] {
        let err = misbehaving(pushes);
        assert!(err.is_fatal());
        match err {
            Error::Integrity { expected, actual, ref fimp, .. } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, pushes);
                assert_eq!(fimp, "pair<T T>");
            }
            other => panic!("expected integrity error, got {other}"),
        }
    }
}

// --- Control flow ---

#[test]
fn if_never_runs_other_branch() {
    let mut it = Interpreter::new();
    // `drop` on an empty stack would underflow if reached
    assert_eq!(eval(&mut it, "if: t 1 drop"), ["1"]);
    it.clear_stack();
    assert_eq!(eval(&mut it, "if: f drop 2"), ["2"]);
}

#[test]
fn if_jump_distances() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "if: t 1 2");
    it.compile(&forms).unwrap();
    assert_eq!(it.disassemble(), "0\tPush t\n1\tElse 2\n2\tPush 1\n3\tSkip 1\n4\tPush 2\n");
    assert!(matches!(it.ops()[1], Op::Else(2)));
}

// --- Compilation ---

#[test]
fn compile_fimp_twice_is_noop() {
    let mut it = Interpreter::new();
    eval(&mut it, "func: inc <Int> Int (1 +)");
    let fimp = it.fimp_id("inc<Int>").unwrap();
    let before = it.ops().len();
    assert!(!it.compile_fimp(fimp, Pos::UNKNOWN).unwrap());
    assert_eq!(it.ops().len(), before);
}

#[test]
fn disassemble_fimp_layout() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "func: inc <Int> Int (1 +)");
    it.compile(&forms).unwrap();
    assert_eq!(
        it.disassemble(),
        "0\tFimp inc<Int> 5\n1\tBegin\n2\tPush 1\n3\tDispatch +\n4\tEnd\n5\tReturn\n"
    );
    let fimp = it.fimp(it.fimp_id("inc<Int>").unwrap());
    assert_eq!(fimp.start(), Some(1));
    assert_eq!(fimp.len(), 5);
}

#[test]
fn lambda_layout() {
    let mut it = Interpreter::new();
    let forms = read(&mut it, "lambda: (1 +)");
    it.compile(&forms).unwrap();
    assert_eq!(
        it.disassemble(),
        "0\tLambda 1:5\n1\tBegin\n2\tPush 1\n3\tDispatch +\n4\tEnd\n5\tReturn\n"
    );
}

// --- Diagnostics ---

#[test]
fn error_renders_with_source() {
    let src = "1 2 +\nt 1 +";
    let mut it = Interpreter::new();
    let forms = read(&mut it, src);
    it.compile(&forms).unwrap();
    let err = it.run().unwrap_err();

    let d = Diagnostic::from(&err).with_source(src);
    let out = AnsiRenderer { use_color: false }.render(&d);
    let headline = "error[dispatch]: no implementation of + matches <Bool Int>";
    assert!(out.starts_with(headline), "{out}");
    assert!(out.contains("--> 2:5"), "{out}");
    assert!(out.contains("2 | t 1 +"), "{out}");

    let v: serde_json::Value = serde_json::from_str(&json::render(&d)).unwrap();
    assert_eq!(v["code"], "dispatch");
    assert_eq!(v["label"]["pos"]["line"], 2);
}
