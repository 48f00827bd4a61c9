/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Pid, ThreadId};
use crate::process::ProcessState;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kernel errno values surfaced to user-level system calls
pub mod errno {
    pub const EINVAL: i32 = 8;
    pub const ENPROC: i32 = 12;
    pub const ESRCH: i32 = 15;
    pub const ECHILD: i32 = 16;
}

/// Process core operation result
pub type ProcResult<T> = Result<T, ProcError>;

/// Process core errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcError {
    #[error("Process table full: {live} live processes, limit {limit}")]
    #[diagnostic(
        code(process::resource_exhausted),
        help("Every PID is in use. Reap exited children before creating more processes.")
    )]
    ResourceExhausted { live: usize, limit: usize },

    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been reaped, or is not a child of the caller.")
    )]
    NotFound(Pid),

    #[error("Thread {tid} already belongs to process {owner}")]
    #[diagnostic(
        code(process::already_assigned),
        help("Detach the thread from its current process first.")
    )]
    AlreadyAssigned { tid: ThreadId, owner: Pid },

    #[error("Process {pid} is {state:?}")]
    #[diagnostic(
        code(process::invalid_state),
        help("Operation cannot be performed in the current process state.")
    )]
    InvalidState { pid: Pid, state: ProcessState },

    #[error("Invariant violated: {0}")]
    #[diagnostic(code(process::invariant_violation))]
    InvariantViolation(String),
}

impl ProcError {
    /// Errno handed back to user space for this error
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::ResourceExhausted { .. } => errno::ENPROC,
            Self::NotFound(_) => errno::ESRCH,
            Self::AlreadyAssigned { .. } | Self::InvalidState { .. } => errno::EINVAL,
            Self::InvariantViolation(_) => errno::EINVAL,
        }
    }

    /// Whether the caller can continue after this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_))
    }
}

/// Kernel assertion: report a broken invariant and stop.
///
/// Invariant violations are programming errors in the caller, not runtime
/// conditions, so they never travel back through a `Result`.
#[cold]
#[track_caller]
pub fn fatal(err: ProcError) -> ! {
    tracing::error!(error = %err, "fatal process core invariant violation");
    panic!("{}", err)
}
