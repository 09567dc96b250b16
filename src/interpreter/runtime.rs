use std::io;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::host::{LogSink, StdoutSink, UserReader};
use crate::interpreter::ir::{Action, Criteria};
use crate::interpreter::parser::decode_action_within;
use crate::interpreter::value::{User, Value};
use crate::interpreter::ProgramError;

/// Default limit on nested `match` continuations, top-level action included.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors surfaced while executing a program.
#[derive(Debug, Error)]
pub enum RunError<E> {
    /// `match` or `log` ran before any `read` populated the context.
    #[error("'{action}' executed before any user was read")]
    MissingUser {
        /// Tag of the action that needed a user.
        action: &'static str,
    },

    /// The reader failed; the error is passed through untouched.
    #[error(transparent)]
    Reader(E),

    /// The log sink failed.
    #[error("log sink failed")]
    Logger(#[source] io::Error),

    /// A raw action could not be decoded.
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// A continuation chain nests deeper than the configured limit.
    #[error("action nesting exceeds the configured limit of {limit}")]
    TooDeep {
        /// Configured maximum depth.
        limit: usize,
    },
}

/// Observable state of a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState<'a> {
    /// No `read` has executed yet.
    Empty,
    /// Holds the most recently read user.
    Populated(&'a User),
}

/// Mutable state owned by a single run.
#[derive(Debug, Clone, Default)]
pub struct Context {
    current_user: Option<User>,
}

impl Context {
    /// Fresh, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The user loaded by the latest `read`, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Current state of the context.
    pub fn state(&self) -> ContextState<'_> {
        match &self.current_user {
            Some(user) => ContextState::Populated(user),
            None => ContextState::Empty,
        }
    }
}

/// Interpreter settings.
#[derive(Debug, Clone)]
pub struct InterpreterConfig<L = StdoutSink> {
    /// Sink receiving values emitted by `log` actions.
    pub logger: L,
    /// Maximum nesting depth of a single action tree.
    pub max_depth: usize,
}

impl<L> InterpreterConfig<L> {
    /// Configuration with the given sink and default limits.
    pub fn with_logger(logger: L) -> Self {
        Self {
            logger,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for InterpreterConfig<StdoutSink> {
    fn default() -> Self {
        Self::with_logger(StdoutSink)
    }
}

/// `true` when every criterion equals the corresponding field of `user`.
///
/// Keys that name no field never match. Empty criteria always match.
pub fn matches(criteria: &Criteria, user: &User) -> bool {
    criteria.iter().all(|(key, expected)| {
        user.field(key)
            .is_some_and(|actual| actual.same_as(expected))
    })
}

/// Executes action programs against a reader and a log sink.
pub struct Interpreter<R, L = StdoutSink> {
    reader: R,
    config: InterpreterConfig<L>,
}

impl<R: UserReader> Interpreter<R> {
    /// Create an interpreter that logs to standard output.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, InterpreterConfig::default())
    }
}

impl<R: UserReader, L: LogSink> Interpreter<R, L> {
    /// Create an interpreter with explicit configuration.
    pub fn with_config(reader: R, config: InterpreterConfig<L>) -> Self {
        Self { reader, config }
    }

    /// Execute `actions` in order against a fresh context.
    ///
    /// The first error aborts the run; later actions are not executed.
    pub fn run(&self, actions: &[Action]) -> Result<(), RunError<R::Error>> {
        let span = tracing::debug_span!("run", actions = actions.len());
        let _enter = span.enter();

        let mut context = Context::new();
        for action in actions {
            self.execute_action(action, &mut context)?;
        }
        debug!("run completed");
        Ok(())
    }

    /// Execute undecoded JSON actions, decoding each one just before it runs.
    ///
    /// Actions preceding an undecodable one have already taken effect when the
    /// error is returned.
    pub fn run_raw(&self, actions: &[serde_json::Value]) -> Result<(), RunError<R::Error>> {
        let span = tracing::debug_span!("run_raw", actions = actions.len());
        let _enter = span.enter();

        let mut context = Context::new();
        for json in actions {
            let action = decode_action_within(json, self.config.max_depth)?;
            self.execute_action(&action, &mut context)?;
        }
        debug!("run completed");
        Ok(())
    }

    /// Execute one top-level action against `context`.
    pub fn execute_action(
        &self,
        action: &Action,
        context: &mut Context,
    ) -> Result<(), RunError<R::Error>> {
        self.execute(action, context, 1)
    }

    fn execute(
        &self,
        action: &Action,
        context: &mut Context,
        depth: usize,
    ) -> Result<(), RunError<R::Error>> {
        if depth > self.config.max_depth {
            return Err(RunError::TooDeep {
                limit: self.config.max_depth,
            });
        }
        debug!(action = action.kind(), depth, "executing action");

        match action {
            Action::Read { params } => {
                let user = self.reader.read(params).map_err(RunError::Reader)?;
                context.current_user = Some(user);
            }
            Action::Match {
                criteria,
                on_success,
                on_fail,
            } => {
                let Some(user) = context.current_user() else {
                    return Err(RunError::MissingUser { action: "match" });
                };
                let matched = matches(criteria, user);
                trace!(user = user.id, matched, "evaluated criteria");

                let next = if matched { on_success } else { on_fail };
                if let Some(next) = next {
                    self.execute(next, context, depth + 1)?;
                }
            }
            Action::Log { key } => {
                let Some(user) = context.current_user() else {
                    return Err(RunError::MissingUser { action: "log" });
                };
                let value = match user.field(key) {
                    Some(value) => value,
                    None => {
                        warn!(key = %key, "log key names no user field; logging the key itself");
                        Value::String(key.clone())
                    }
                };
                self.config.logger.log(&value).map_err(RunError::Logger)?;
            }
            Action::Noop => {}
        }
        Ok(())
    }

    /// Access the log sink.
    pub fn logger(&self) -> &L {
        &self.config.logger
    }

    /// Active configuration.
    pub fn config(&self) -> &InterpreterConfig<L> {
        &self.config
    }
}
