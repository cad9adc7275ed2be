//! Monitor limits.

/// Default number of remembered command lines.
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;
/// Exclusive upper bound on the step count of one `step` command.
pub const DEFAULT_STEP_LIMIT: i64 = 1_000_000;
/// Maximum nesting of `exefile` scripts.
pub const DEFAULT_SCRIPT_DEPTH: usize = 8;

/// Tunables of a monitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Capacity of the command history.
    pub history_capacity: usize,
    /// Step counts must stay strictly below this.
    pub step_limit: i64,
    /// Scripts may nest this deep.
    pub script_depth: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            step_limit: DEFAULT_STEP_LIMIT,
            script_depth: DEFAULT_SCRIPT_DEPTH,
        }
    }
}
