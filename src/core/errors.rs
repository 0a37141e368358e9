/*!
 * Error Types
 * Fatal harness failures surfaced through the orchestrator
 */

use std::fmt;
use thiserror::Error;

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Which task population an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    Reader,
    Writer,
}

impl TaskRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskRole::Reader => "reader",
            TaskRole::Writer => "writer",
        }
    }
}

impl fmt::Display for TaskRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal harness errors
///
/// Every variant terminates the run. Once any task fails, the benchmark
/// reports no partial timing results.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to spawn {role} thread {ordinal}: {source}")]
    Spawn {
        role: TaskRole,
        ordinal: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("{role} thread {ordinal} panicked before completing")]
    TaskFailed { role: TaskRole, ordinal: usize },
}
