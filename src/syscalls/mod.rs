/*!
 * System Call Adapters
 * Process syscalls expressed over the lifecycle interface
 */

pub mod process;

pub use process::{mkwait_exit, sys_exit, sys_getpid, sys_getppid, sys_waitpid, SyscallResult};
