//! Execflow CLI - Command-line interface for the action interpreter
//!
//! Runs JSON action programs against a JSON user directory, validates
//! programs without running them, and replays the canonical demo scenario.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use execflow::host::{LogSink, StdoutSink, TracingSink, UserDirectory};
use execflow::interpreter::{
    Action, Criteria, Interpreter, InterpreterConfig, load_program, runtime::DEFAULT_MAX_DEPTH,
};
use execflow::{User, Value};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "execflow")]
#[command(about = "Declarative action interpreter", long_about = None)]
struct Cli {
    /// Maximum nesting depth of a single action tree
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkKind {
    /// Print each logged value on its own line
    Stdout,
    /// Emit logged values as tracing events
    Tracing,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a program
    Run {
        /// Program file (JSON array of actions)
        program: PathBuf,

        /// User directory file (JSON array of users)
        #[arg(short, long)]
        users: PathBuf,

        /// Where logged values go
        #[arg(long, value_enum, default_value = "stdout")]
        sink: SinkKind,

        /// Decode actions one at a time, so actions before a bad one still run
        #[arg(long)]
        lenient: bool,
    },

    /// Decode a program and summarize it without running
    Check {
        /// Program file (JSON array of actions)
        program: PathBuf,
    },

    /// Run the built-in read/match/log scenario
    Demo {
        /// Name given to user 15
        #[arg(long, default_value = "marcus")]
        name: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            program,
            users,
            sink,
            lenient,
        } => {
            let directory = UserDirectory::load(&users)?;
            match sink {
                SinkKind::Stdout => run(directory, StdoutSink, cli.max_depth, &program, lenient)?,
                SinkKind::Tracing => {
                    run(directory, TracingSink, cli.max_depth, &program, lenient)?
                }
            }
        }

        Commands::Check { program } => {
            let actions = load_program(&program)?;
            println!("{} top-level actions", actions.len());
            for (index, action) in actions.iter().enumerate() {
                println!("  {}: {} (depth {})", index, action.kind(), action.depth());
            }
            if let Some(deepest) = actions.iter().map(Action::depth).max() {
                if deepest > cli.max_depth {
                    bail!(
                        "deepest action nests {} levels, limit is {}",
                        deepest,
                        cli.max_depth
                    );
                }
            }
        }

        Commands::Demo { name } => {
            let directory = UserDirectory::from_users([User::new(15, name, 42)]);
            let mut criteria = Criteria::new();
            criteria.insert("name".into(), Value::from("marcus"));
            let actions = [
                Action::read(15),
                Action::matching(criteria, Some(Action::log("age")), Some(Action::noop())),
            ];

            let config = InterpreterConfig {
                logger: StdoutSink,
                max_depth: cli.max_depth,
            };
            Interpreter::with_config(directory, config).run(&actions)?;
        }
    }

    Ok(())
}

fn run<L: LogSink>(
    directory: UserDirectory,
    logger: L,
    max_depth: usize,
    program: &Path,
    lenient: bool,
) -> Result<()> {
    let interpreter = Interpreter::with_config(directory, InterpreterConfig { logger, max_depth });
    if lenient {
        let source = std::fs::read_to_string(program)
            .with_context(|| format!("Failed to read program: {:?}", program))?;
        let raw: Vec<serde_json::Value> = serde_json::from_str(&source)
            .with_context(|| format!("Program is not a JSON array: {:?}", program))?;
        interpreter.run_raw(&raw)?;
    } else {
        let actions = load_program(program)?;
        interpreter.run(&actions)?;
    }
    Ok(())
}
