/*!
 * Kernel Process Core
 * Process records, bounded PID table and the exit/wait protocol
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod syscalls;

// Re-exports
pub use crate::core::errors::{ProcError, ProcResult};
pub use crate::core::limits::{KERNEL_PID, MAX_PID, MIN_PID, PROC_NO_PID};
pub use crate::core::types::{ExitCode, Pid, ThreadId};
pub use monitoring::init_tracing;
pub use process::{
    AddressSpace, DirectoryHandle, Process, ProcessInfo, ProcessLifecycle, ProcessManager,
    ProcessManagerBuilder, ProcessState, ProcessTable, Thread,
};
