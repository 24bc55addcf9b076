use std::rc::Rc;

use crate::scope::Scope;
use crate::types::TypeId;

/// A closure: body start offset in the op sequence plus the scope it was created in.
#[derive(Debug)]
pub struct Lambda {
    pub start: usize,
    pub nops: usize,
    pub scope: Rc<Scope>,
}

#[derive(Debug, Clone)]
pub enum Payload {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Lambda(Rc<Lambda>),
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Nil, Payload::Nil) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Float(a), Payload::Float(b)) => a == b,
            (Payload::Str(a), Payload::Str(b)) => a == b,
            (Payload::Lambda(a), Payload::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Tagged value: a type plus a payload, or no payload when used as a dispatch pattern.
#[derive(Debug, Clone)]
pub struct Value {
    pub ty: TypeId,
    pub data: Option<Payload>,
}

impl Value {
    pub fn new(ty: TypeId, data: Payload) -> Self {
        Value { ty, data: Some(data) }
    }

    /// Pattern placeholder matching any value whose type isa `ty`.
    pub fn undef(ty: TypeId) -> Self {
        Value { ty, data: None }
    }

    pub fn int(ty: TypeId, v: i64) -> Self {
        Value::new(ty, Payload::Int(v))
    }

    pub fn float(ty: TypeId, v: f64) -> Self {
        Value::new(ty, Payload::Float(v))
    }

    pub fn boolean(ty: TypeId, v: bool) -> Self {
        Value::new(ty, Payload::Bool(v))
    }

    pub fn string(ty: TypeId, v: &str) -> Self {
        Value::new(ty, Payload::Str(Rc::from(v)))
    }

    pub fn is_defined(&self) -> bool {
        self.data.is_some()
    }

    /// Exact equality. Values of different types never compare equal.
    pub fn eqval(&self, other: &Value) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => self.ty == other.ty && a == b,
            _ => false,
        }
    }

    /// Identity: same type, shared payloads by pointer and scalars by value.
    pub fn is(&self, other: &Value) -> bool {
        if self.ty != other.ty {
            return false;
        }
        match (&self.data, &other.data) {
            (Some(Payload::Str(a)), Some(Payload::Str(b))) => Rc::ptr_eq(a, b),
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering between payloads of the same kind; `None` when they don't compare.
    pub fn less_than(&self, other: &Value) -> Option<bool> {
        match (self.data.as_ref()?, other.data.as_ref()?) {
            (Payload::Int(a), Payload::Int(b)) => Some(a < b),
            (Payload::Float(a), Payload::Float(b)) => Some(a < b),
            (Payload::Str(a), Payload::Str(b)) => Some(a < b),
            (Payload::Bool(a), Payload::Bool(b)) => Some(a < b),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        !matches!(self.data, None | Some(Payload::Nil) | Some(Payload::Bool(false)))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            Some(Payload::Int(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.data {
            Some(Payload::Float(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Some(Payload::Bool(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Some(Payload::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Rc<Lambda>> {
        match &self.data {
            Some(Payload::Lambda(l)) => Some(l),
            _ => None,
        }
    }

    /// Renders the payload; `type_name` is used for undefined patterns.
    pub fn render(&self, type_name: &str) -> String {
        match &self.data {
            None => type_name.to_string(),
            Some(Payload::Nil) => "nil".to_string(),
            Some(Payload::Bool(true)) => "t".to_string(),
            Some(Payload::Bool(false)) => "f".to_string(),
            Some(Payload::Int(v)) => v.to_string(),
            Some(Payload::Float(v)) => {
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{v:.1}")
                } else {
                    v.to_string()
                }
            }
            Some(Payload::Str(s)) => format!("{s:?}"),
            Some(Payload::Lambda(l)) => format!("(Lambda {}:{})", l.start, l.nops),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INT: TypeId = TypeId(1);
    const FLOAT: TypeId = TypeId(2);
    const BOOL: TypeId = TypeId(3);

    #[test]
    fn eqval_same_type() {
        assert!(Value::int(INT, 5).eqval(&Value::int(INT, 5)));
        assert!(!Value::int(INT, 5).eqval(&Value::int(INT, 6)));
    }

    #[test]
    fn eqval_across_types_is_false() {
        assert!(!Value::int(INT, 1).eqval(&Value::float(FLOAT, 1.0)));
        // same payload under a different type tag
        assert!(!Value::int(INT, 1).eqval(&Value::int(FLOAT, 1)));
    }

    #[test]
    fn undefined_never_equal() {
        assert!(!Value::undef(INT).eqval(&Value::undef(INT)));
        assert!(!Value::undef(INT).eqval(&Value::int(INT, 0)));
    }

    #[test]
    fn identity_shares_strings_by_pointer() {
        let a = Value::string(INT, "a");
        assert!(a.is(&a.clone()));
        assert!(!a.is(&Value::string(INT, "a")));
        assert!(a.eqval(&Value::string(INT, "a")));
        assert!(Value::int(INT, 3).is(&Value::int(INT, 3)));
        assert!(!Value::int(INT, 3).is(&Value::int(FLOAT, 3)));
        assert!(!Value::undef(INT).is(&Value::undef(INT)));
    }

    #[test]
    fn ordering_within_a_kind() {
        assert_eq!(Value::string(INT, "abc").less_than(&Value::string(INT, "abd")), Some(true));
        assert_eq!(Value::float(FLOAT, 2.0).less_than(&Value::float(FLOAT, 1.0)), Some(false));
        assert_eq!(Value::boolean(BOOL, false).less_than(&Value::boolean(BOOL, true)), Some(true));
        assert_eq!(Value::int(INT, 1).less_than(&Value::float(FLOAT, 2.0)), None);
        assert_eq!(Value::undef(INT).less_than(&Value::int(INT, 2)), None);
    }

    #[test]
    fn truthiness() {
        assert!(Value::boolean(BOOL, true).is_true());
        assert!(!Value::boolean(BOOL, false).is_true());
        assert!(!Value::new(BOOL, Payload::Nil).is_true());
        assert!(!Value::undef(INT).is_true());
        assert!(Value::int(INT, 0).is_true());
    }

    #[test]
    fn render_payloads() {
        assert_eq!(Value::int(INT, -3).render("Int"), "-3");
        assert_eq!(Value::float(FLOAT, 2.0).render("Float"), "2.0");
        assert_eq!(Value::float(FLOAT, 2.5).render("Float"), "2.5");
        assert_eq!(Value::boolean(BOOL, false).render("Bool"), "f");
        assert_eq!(Value::undef(INT).render("Int"), "Int");
        assert_eq!(Value::string(INT, "hi").render("Str"), "\"hi\"");
    }
}
