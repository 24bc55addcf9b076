/// An entry in the error code registry.
pub struct ErrorEntry {
    pub code: &'static str,
    pub short: &'static str,
    /// Fix to suggest alongside the diagnostic, if there is a general one.
    pub hint: Option<&'static str>,
    pub long: &'static str,
}

/// One entry per [`crate::Error`] variant, keyed by [`crate::Error::code`].
pub static REGISTRY: &[ErrorEntry] = &[
    ErrorEntry {
        code: "syntax",
        short: "malformed form",
        hint: None,
        long: r#"## syntax: malformed form

A macro was missing one of its parts, received the wrong kind of form, or a
type list appeared where no function call precedes it.

    if: t 1

`if:` needs a condition, a then branch and an else branch.
"#,
    },
    ErrorEntry {
        code: "lookup",
        short: "unknown name",
        hint: Some("check the spelling, and that the definition comes before its first use"),
        long: r#"## lookup: unknown name

An identifier is neither a macro nor a function, a type name in a type list
is not registered, or a variable read with `@` is not bound in any enclosing
scope.
"#,
    },
    ErrorEntry {
        code: "dispatch",
        short: "no matching implementation",
        hint: Some("add an implementation for these argument types, or convert the arguments"),
        long: r#"## dispatch: no matching implementation

None of the function's implementations accepts the values on top of the
stack. The message lists the types that were found.

    t 1 +

`+` is implemented for `<Int Int>` and `<Float Float>` only.
"#,
    },
    ErrorEntry {
        code: "integrity",
        short: "native broke its declared arity",
        hint: None,
        long: r#"## integrity: native broke its declared arity

A native implementation left the stack at a different depth than its
argument and result counts promise. This is a bug in the native, not in the
program that called it.
"#,
    },
    ErrorEntry {
        code: "underflow",
        short: "stack underflow",
        hint: Some("push the operands before the operation that consumes them"),
        long: r#"## underflow: stack underflow

An operation needed more values than the stack holds.

    drop
"#,
    },
    ErrorEntry {
        code: "redefinition",
        short: "name already defined",
        hint: None,
        long: r#"## redefinition: name already defined

A type or macro was registered under a name that is already taken.
"#,
    },
];

pub fn lookup(code: &str) -> Option<&'static ErrorEntry> {
    REGISTRY.iter().find(|e| e.code == code)
}
