//! Line tokenizer, command table, history recording and script mode.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{InternalFault, RuleError};
use crate::history::CommandHistory;
use crate::pipeline::{Env, Pipeline, Rules, Verdict};
use crate::render::MemoryTable;

/// Reply to a name that resolves to no command.
pub const UNKNOWN_COMMAND: &str = "E: Unknown command";
/// Reply to a script started beyond the nesting limit.
pub const SCRIPT_TOO_DEEP: &str = "E: script nesting too deep";
/// Prefix echoed before every script line.
pub const SCRIPT_ECHO: &str = "..>";
/// Re-executes the most recently accepted line.
pub const REPEAT_TOKEN: &str = "!!";
/// Token produced by an interrupted input source; ignored.
pub const INTERRUPT_TOKEN: &str = "KeyboardInterrupt";

/// Output of one processed line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Reply {
    /// No-op lines and silent commands.
    #[default]
    Empty,
    /// Plain text, including `"E: ..."` operator errors.
    Text(String),
    /// Memory view.
    Table(MemoryTable),
    /// Transcript of a script run.
    Script(Vec<ScriptEntry>),
}

impl Reply {
    /// Returns `true` when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Table(table) => table.is_empty(),
            Self::Script(entries) => entries.is_empty(),
        }
    }

    /// Wraps text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Table(table) => write!(f, "{table}"),
            Self::Script(entries) => {
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{SCRIPT_ECHO}{}", entry.line)?;
                    if !entry.reply.is_empty() {
                        write!(f, "\n{}", entry.reply)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// One echoed script line and what it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Line as read from the script.
    pub line: String,
    /// Its reply, failures included.
    pub reply: Reply,
}

/// What a handler asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show this reply.
    Reply(Reply),
    /// Run these lines in script mode.
    RunScript(Vec<String>),
    /// List commands (empty topic) or show one help line.
    Help(String),
}

impl From<Reply> for Effect {
    fn from(reply: Reply) -> Self {
        Self::Reply(reply)
    }
}

/// Command body; runs only after every gate passed.
pub type Handler<C> = fn(&mut C, &Env) -> Result<Effect, InternalFault>;

struct Command<C> {
    help: &'static str,
    pipeline: Pipeline<C>,
    handler: Handler<C>,
    verbatim: bool,
}

/// Resolves lines to commands and owns the history.
pub struct CommandDispatcher<C> {
    commands: BTreeMap<&'static str, Command<C>>,
    history: CommandHistory,
    script_depth: usize,
    max_script_depth: usize,
}

impl<C> CommandDispatcher<C> {
    /// Creates an empty command table.
    #[must_use]
    pub fn new(history_capacity: usize, max_script_depth: usize) -> Self {
        Self {
            commands: BTreeMap::new(),
            history: CommandHistory::new(history_capacity),
            script_depth: 0,
            max_script_depth,
        }
    }

    /// Registers a command whose arguments are split on spaces.
    ///
    /// # Errors
    ///
    /// [`RuleError`] when the rules are malformed or the name is taken.
    pub fn register(
        &mut self,
        name: &'static str,
        help: &'static str,
        rules: Rules<C>,
        handler: Handler<C>,
    ) -> Result<(), RuleError> {
        self.insert(name, help, rules, handler, false)
    }

    /// Registers a command that receives everything after its name as a
    /// single argument.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::register`].
    pub fn register_verbatim(
        &mut self,
        name: &'static str,
        help: &'static str,
        rules: Rules<C>,
        handler: Handler<C>,
    ) -> Result<(), RuleError> {
        self.insert(name, help, rules, handler, true)
    }

    fn insert(
        &mut self,
        name: &'static str,
        help: &'static str,
        rules: Rules<C>,
        handler: Handler<C>,
        verbatim: bool,
    ) -> Result<(), RuleError> {
        if self.commands.contains_key(name) {
            return Err(RuleError::DuplicateCommand { name });
        }
        let pipeline = rules.build()?;
        log::debug!("registered command `{name}`");
        self.commands.insert(
            name,
            Command {
                help,
                pipeline,
                handler,
                verbatim,
            },
        );
        Ok(())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Accepted lines.
    #[must_use]
    pub const fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Accepted lines, for cursor navigation.
    pub const fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    /// Processes one input line.
    ///
    /// Blank lines, `;` comments and [`INTERRUPT_TOKEN`] are no-ops. Every
    /// other line is recorded in history before it runs, unless it comes
    /// from a script.
    ///
    /// # Errors
    ///
    /// [`InternalFault`] from an invariant gate or a handler.
    pub fn execute(&mut self, context: &mut C, line: &str) -> Result<Reply, InternalFault> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        let head = line.split(' ').next().unwrap_or_default();
        if head.is_empty() || head.starts_with(';') || head == INTERRUPT_TOKEN {
            return Ok(Reply::Empty);
        }
        if head == REPEAT_TOKEN {
            return self
                .history
                .last()
                .map(str::to_owned)
                .map_or(Ok(Reply::Empty), |last| self.execute(context, &last));
        }
        if self.script_depth == 0 {
            self.history.push(line);
        }

        let (name, remainder) = line.split_once(' ').unwrap_or((line, ""));
        let Some(command) = self.commands.get(name) else {
            log::debug!("no command named `{name}`");
            return Ok(Reply::text(UNKNOWN_COMMAND));
        };
        let args = if command.verbatim {
            if remainder.is_empty() {
                Vec::new()
            } else {
                vec![remainder.to_owned()]
            }
        } else {
            remainder
                .split(' ')
                .filter(|token| !token.is_empty())
                .map(str::to_owned)
                .collect()
        };
        log::debug!("resolved `{name}` with {} argument(s)", args.len());

        let handler = command.handler;
        let env = match command.pipeline.evaluate(context, args)? {
            Verdict::Proceed(env) => env,
            Verdict::Reject(message) => return Ok(Reply::Text(message)),
        };
        match handler(context, &env)? {
            Effect::Reply(reply) => Ok(reply),
            Effect::RunScript(lines) => self.run_script(context, lines),
            Effect::Help(topic) => Ok(self.help(&topic)),
        }
    }

    /// Runs `lines` in script mode: each is echoed, none is recorded, and a
    /// failing line does not stop the ones after it.
    ///
    /// # Errors
    ///
    /// The first [`InternalFault`] aborts the script.
    pub fn run_script(&mut self, context: &mut C, lines: Vec<String>) -> Result<Reply, InternalFault> {
        if self.script_depth >= self.max_script_depth {
            return Ok(Reply::text(SCRIPT_TOO_DEEP));
        }
        self.script_depth += 1;
        let mut entries = Vec::with_capacity(lines.len());
        let mut outcome = Ok(());
        for line in lines {
            let line = line.trim_end().to_owned();
            match self.execute(context, &line) {
                Ok(reply) => entries.push(ScriptEntry { line, reply }),
                Err(fault) => {
                    outcome = Err(fault);
                    break;
                }
            }
        }
        self.script_depth -= 1;
        outcome.map(|()| Reply::Script(entries))
    }

    fn help(&self, topic: &str) -> Reply {
        if topic.is_empty() {
            return Reply::Text(self.names().collect::<Vec<_>>().join(" "));
        }
        self.commands
            .get(topic)
            .map_or_else(|| Reply::text(UNKNOWN_COMMAND), |c| Reply::text(c.help))
    }
}
