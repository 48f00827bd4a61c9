/*!
 * Process Manager Builder
 * Builder pattern for ProcessManager construction
 */

use super::manager::ProcessManager;
use crate::core::errors::{fatal, ProcError};
use crate::core::limits::{KERNEL_PID, KERNEL_PROCESS_NAME, PID_SPACE};
use crate::process::core::traits::DirectoryHandle;
use crate::process::record::Process;
use crate::process::table::ProcessTable;
use std::sync::Arc;
use tracing::info;

/// Builder for ProcessManager
pub struct ProcessManagerBuilder {
    pid_limit: usize,
    kernel_name: String,
    kernel_cwd: Option<Arc<dyn DirectoryHandle>>,
}

impl ProcessManagerBuilder {
    /// Create a new ProcessManager builder
    pub fn new() -> Self {
        Self {
            pid_limit: PID_SPACE,
            kernel_name: KERNEL_PROCESS_NAME.to_string(),
            kernel_cwd: None,
        }
    }

    /// Cap the number of simultaneously registered records (kernel included).
    ///
    /// Clamped to `1..=MAX_PID - MIN_PID`.
    pub fn with_pid_limit(mut self, limit: usize) -> Self {
        self.pid_limit = limit;
        self
    }

    pub fn with_kernel_name(mut self, name: impl Into<String>) -> Self {
        self.kernel_name = name.into();
        self
    }

    /// Working directory of the kernel record, inherited by parentless processes
    pub fn with_kernel_cwd(mut self, cwd: Arc<dyn DirectoryHandle>) -> Self {
        self.kernel_cwd = Some(cwd);
        self
    }

    /// Bootstrap the process table and register the kernel record
    pub fn build(self) -> ProcessManager {
        let table = ProcessTable::bootstrap(self.pid_limit);
        let kproc = Process::new(&self.kernel_name, self.kernel_cwd);

        match table.add(&kproc, None) {
            Ok(KERNEL_PID) => {}
            Ok(pid) => fatal(ProcError::InvariantViolation(format!(
                "kernel record registered as pid {pid}"
            ))),
            Err(err) => fatal(err),
        }

        info!(
            pid_limit = table.pid_limit(),
            kernel = %self.kernel_name,
            "Process manager initialized"
        );
        ProcessManager::from_parts(table, kproc)
    }
}

impl Default for ProcessManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
