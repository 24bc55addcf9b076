/// Interpreter construction options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Install the `home` library (core types, control macros, arithmetic).
    pub home: bool,
    /// Emit a `trace!` event for every executed op.
    pub trace: bool,
    pub stack_capacity: usize,
    pub call_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options { home: true, trace: false, stack_capacity: 64, call_capacity: 16 }
    }
}

impl Options {
    /// Only the wildcard type; everything else is up to the host.
    pub fn bare() -> Self {
        Options { home: false, ..Options::default() }
    }

    pub fn with_home(mut self, home: bool) -> Self {
        self.home = home;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_stack_capacity(mut self, n: usize) -> Self {
        self.stack_capacity = n;
        self
    }

    pub fn with_call_capacity(mut self, n: usize) -> Self {
        self.call_capacity = n;
        self
    }
}
