//! quill: a stack-oriented toolchain with typed multiple dispatch.
//!
//! Programs arrive as [`Form`] trees, are compiled into a flat [`Op`] sequence owned by the
//! [`Interpreter`], and run on an operand stack. Functions carry any number of implementations
//! (fimps); calls pick the closest one by type distance, either statically from a type list or
//! at run time from the values on the stack.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod error;
pub mod func;
pub mod interp;
pub mod libs;
pub mod op;
pub mod scope;
pub mod sym;
pub mod types;
pub mod value;
pub mod vm;

#[cfg(test)]
extern crate self as quill;
#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod testing;

pub use ast::{Form, FormCursor, FormKind, Pos};
pub use config::Options;
pub use error::{Error, LookupKind, Result};
pub use func::{FimpId, FuncId};
pub use interp::Interpreter;
pub use op::Op;
pub use sym::Sym;
pub use types::TypeId;
pub use value::{Payload, Value};
