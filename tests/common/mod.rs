//! Test reader: words, `(...)` groups, `<T ...>` type lists, ints, floats and `"strings"`.
//!
//! Also compiled into the library's unit tests as `crate::testing`.

use quill::{Form, Interpreter, Pos, Value};

pub fn read(it: &mut Interpreter, src: &str) -> Vec<Form> {
    let mut tokens = Vec::new();
    for (l, line) in src.lines().enumerate() {
        let mut chars = line.char_indices().peekable();
        while let Some(&(c0, ch)) = chars.peek() {
            let pos = Pos::new(l + 1, c0 + 1);
            match ch {
                ' ' | '\t' => {
                    chars.next();
                }
                '(' | ')' | '<' | '>' => {
                    chars.next();
                    tokens.push((ch.to_string(), pos));
                }
                '"' => {
                    let mut word = String::from('"');
                    chars.next();
                    for (_, c) in chars.by_ref() {
                        if c == '"' {
                            break;
                        }
                        word.push(c);
                    }
                    tokens.push((word, pos));
                }
                _ => {
                    let mut word = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        // a lone `<` is the less-than function, not a type list
                        let bracket = (c == '>' || c == '<') && !word.is_empty();
                        if c.is_whitespace() || c == '(' || c == ')' || bracket {
                            break;
                        }
                        word.push(c);
                        chars.next();
                    }
                    tokens.push((word, pos));
                }
            }
        }
    }
    let mut at = 0;
    let forms = read_seq(it, &tokens, &mut at);
    assert_eq!(at, tokens.len(), "unbalanced input");
    forms
}

fn starts_type_list(tokens: &[(String, Pos)], at: usize) -> bool {
    tokens
        .get(at)
        .is_some_and(|(t, _)| t.starts_with(char::is_uppercase) || t == "_" || t == ">")
}

fn read_seq(it: &mut Interpreter, tokens: &[(String, Pos)], at: &mut usize) -> Vec<Form> {
    let mut out = Vec::new();
    while let Some((tok, pos)) = tokens.get(*at) {
        let pos = *pos;
        *at += 1;
        let form = match tok.as_str() {
            ")" => return out,
            "(" => Form::sexpr(read_seq(it, tokens, at)),
            "<" if starts_type_list(tokens, *at) => {
                let mut ids = Vec::new();
                while let Some((t, _)) = tokens.get(*at) {
                    *at += 1;
                    if t == ">" {
                        break;
                    }
                    ids.push(it.sym(t));
                }
                Form::type_list(ids)
            }
            word => read_word(it, word),
        };
        out.push(form.at(pos));
    }
    out
}

fn read_word(it: &mut Interpreter, word: &str) -> Form {
    let home = |it: &Interpreter, name: &str| it.type_id(name).expect("home types");
    if let Some(s) = word.strip_prefix('"') {
        Form::literal(Value::string(home(it, "Str"), s))
    } else if let Ok(n) = word.parse::<i64>() {
        Form::literal(Value::int(home(it, "Int"), n))
    } else if let Some(v) = word.parse::<f64>().ok().filter(|_| word.contains('.')) {
        Form::literal(Value::float(home(it, "Float"), v))
    } else {
        Form::id(it.sym(word))
    }
}

/// Compiles and runs `src`, returning the rendered stack.
#[allow(dead_code)]
pub fn eval(it: &mut Interpreter, src: &str) -> Vec<String> {
    let forms = read(it, src);
    it.compile(&forms).expect("compile");
    it.run().expect("run");
    it.stack().iter().map(|v| it.render(v)).collect()
}
