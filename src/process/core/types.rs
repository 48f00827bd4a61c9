/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{ExitCode, Pid, ProcessName};
use serde::{Deserialize, Serialize};

/// Process state
///
/// Transitions are monotonic: `Running -> Exited`, never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process has threads (or may still gain them) and has not exited
    Running,
    /// Process has exited; retained as a zombie until reaped
    Exited,
}

impl ProcessState {
    #[inline(always)]
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, ProcessState::Running)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_exited(self) -> bool {
        matches!(self, ProcessState::Exited)
    }
}

/// Point-in-time view of a process record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppid: Option<Pid>,
    pub name: ProcessName,
    pub state: ProcessState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<ExitCode>,
    pub threads: usize,
    pub has_address_space: bool,
}

impl ProcessInfo {
    /// Zombies are exited records still waiting to be reaped
    #[inline]
    #[must_use]
    pub const fn is_zombie(&self) -> bool {
        self.state.is_exited()
    }
}
