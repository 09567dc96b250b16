//! Execflow – a small declarative action interpreter
//!
//! Programs are lists of typed actions (`read`, `match`, `log`, `noop`) that
//! run against a single mutable context holding the "current user":
//! - Instructions are plain data, serializable to and from JSON
//! - A central dispatcher executes them in order and branches on match results
//! - Users come from a pluggable reader; logged values go to a pluggable sink
//! - Every error aborts the run; there is no partial recovery

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Reader and log sink collaborators.
pub mod host;
/// Instruction set, decoding and the interpreter itself.
pub mod interpreter;

// Re-export key types for convenience
pub use host::{LogSink, MemorySink, StdoutSink, TracingSink, UserDirectory, UserReader};
pub use interpreter::{
    Action, Context, Criteria, Interpreter, InterpreterConfig, ReadParams, RunError, User, Value,
};

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
