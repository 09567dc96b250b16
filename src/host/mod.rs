//! Collaborators consumed by the interpreter.
//!
//! The interpreter never loads users or writes output itself. It asks a
//! [`UserReader`] for users and hands logged values to a [`LogSink`]. Plain
//! closures implement both traits, so tests can wire up ad-hoc collaborators
//! without declaring types.

use std::io;

use crate::interpreter::{ReadParams, User, Value};

/// In-memory user directory reader.
pub mod directory;
/// Log sink implementations.
pub mod sink;

pub use directory::{LookupError, UserDirectory};
pub use sink::{MemorySink, StdoutSink, TracingSink};

/// Source of users for `read` actions.
pub trait UserReader {
    /// Error type surfaced by failed lookups.
    type Error;

    /// Load the user described by `params`.
    fn read(&self, params: &ReadParams) -> Result<User, Self::Error>;
}

/// Destination for values emitted by `log` actions.
pub trait LogSink {
    /// Emit a single value.
    fn log(&self, value: &Value) -> io::Result<()>;
}

impl<F, E> UserReader for F
where
    F: Fn(&ReadParams) -> Result<User, E>,
{
    type Error = E;

    fn read(&self, params: &ReadParams) -> Result<User, E> {
        self(params)
    }
}

impl<F> LogSink for F
where
    F: Fn(&Value) -> io::Result<()>,
{
    fn log(&self, value: &Value) -> io::Result<()> {
        self(value)
    }
}
