//! Interactive monitor for the minicomp machine: a validated command
//! dispatcher with history and script mode, and tabular memory views.

use crossterm as _;
use env_logger as _;

/// Command set and session.
pub mod commands;
pub use commands::{register_commands, Monitor, Session};

/// Session limits.
pub mod config;
pub use config::MonitorConfig;

/// Argument conversions.
pub mod convert;

/// Tokenizer, command table and script mode.
pub mod dispatcher;
pub use dispatcher::{CommandDispatcher, Effect, Handler, Reply, ScriptEntry};

/// Rule, render and internal error types.
pub mod errors;
pub use errors::{InternalFault, Rejected, RenderError, RuleError};

/// Bounded command history.
pub mod history;
pub use history::CommandHistory;

/// Argument validation pipeline.
pub mod pipeline;
pub use pipeline::{Env, ParamSpec, Pipeline, Rules, Value, Verdict};

/// Memory dump and context tables.
pub mod render;
pub use render::{CellFormat, MemoryRow, MemoryTable, RenderCell, RowLabel};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use test_log as _;
