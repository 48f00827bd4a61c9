/*!
 * Process Traits
 * Collaborator abstractions and the lifecycle interface
 */

use super::types::ProcessInfo;
use crate::core::errors::ProcResult;
use crate::core::types::{ExitCode, Pid};
use crate::process::record::Process;
use std::fmt::Debug;
use std::sync::Arc;

/// Opaque virtual address space owned by exactly one process record.
///
/// Supplied by the virtual-memory layer.
pub trait AddressSpace: Send + Debug {
    /// Make this address space current on the executing CPU
    fn activate(&self) {}

    /// Stop using this address space on the executing CPU
    fn deactivate(&self) {}

    /// Release every resource held by the address space
    fn destroy(self: Box<Self>) {}
}

/// Reference-counted directory handle supplied by the filesystem layer.
///
/// Holding an `Arc` is holding one strong reference.
pub trait DirectoryHandle: Send + Sync + Debug {
    /// Path of the directory, for diagnostics
    fn path(&self) -> &str;
}

/// Auxiliary device handle (console) a process may hold
#[cfg(feature = "console")]
pub trait DeviceHandle: Send + Sync + Debug {
    fn device_name(&self) -> &str;
}

/// Process lifecycle management
///
/// The surface consumed by the system-call layer.
pub trait ProcessLifecycle: Send + Sync {
    /// Create a process, optionally as a child of `parent`
    fn create(&self, name: &str, parent: Option<&Arc<Process>>) -> ProcResult<Arc<Process>>;

    /// Transition `process` to exited with `code`
    fn exit(&self, process: &Arc<Process>, code: ExitCode) -> ProcResult<()>;

    /// Block until child `pid` of `parent` exits, reap it and return its exit code
    fn wait(&self, parent: &Arc<Process>, pid: Pid) -> ProcResult<ExitCode>;

    /// Look up a live or zombie process
    fn lookup(&self, pid: Pid) -> ProcResult<Arc<Process>>;

    /// List all processes
    fn list_processes(&self) -> Vec<ProcessInfo>;
}
