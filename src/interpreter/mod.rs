//! Core of the action interpreter.
//!
//! Programs are flat lists of [`Action`] trees. The [`Interpreter`] walks them
//! against a single mutable [`Context`], calling out to a reader to load users
//! and to a log sink to emit values. Nothing here performs I/O on its own; the
//! collaborators in [`crate::host`] do.

/// Instruction set definitions.
pub mod ir;
/// JSON decoding for action programs.
pub mod parser;
/// Interpreter driver and execution context.
pub mod runtime;
/// Dynamic values and the user record.
pub mod value;

pub use ir::{Action, Criteria, ReadParams};
pub use parser::{decode_action, decode_action_within, load_program, parse_program};
pub use runtime::{Context, ContextState, Interpreter, InterpreterConfig, RunError, matches};
pub use value::{User, Value};

use thiserror::Error;

/// Convenience result alias for program decoding.
pub type Result<T> = std::result::Result<T, ProgramError>;

/// Errors surfaced while decoding a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The source is not valid JSON or an action has the wrong shape.
    #[error("invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An action carries a tag outside the instruction set.
    #[error("unknown action type '{0}'")]
    UnknownActionType(String),

    /// An action object has no `type` field.
    #[error("action is missing its 'type' field")]
    MissingType,

    /// Structural problem not covered by the JSON decoder.
    #[error("invalid program: {0}")]
    Invalid(String),
}
