/*!
 * Process Syscalls
 * getpid, getppid, waitpid and _exit
 */

use crate::core::errors::{errno, ProcError};
use crate::core::limits::{PROCESS_GROUP_PID, PROC_NO_PID};
use crate::core::types::{ExitCode, Pid};
use crate::process::{Process, ProcessLifecycle};
use std::sync::Arc;
use tracing::warn;

/// Syscall outcome; the error is the errno returned to user space
pub type SyscallResult<T> = Result<T, i32>;

/// Encode a normal-exit wait status (`_MKWAIT_EXIT`)
#[inline]
#[must_use]
pub const fn mkwait_exit(code: ExitCode) -> i32 {
    (code & 0xff) << 2
}

pub fn sys_getpid(curproc: &Process) -> Pid {
    curproc.pid()
}

/// Parent PID, or `PROC_NO_PID` for parentless processes
pub fn sys_getppid(curproc: &Process) -> Pid {
    curproc.ppid().unwrap_or(PROC_NO_PID)
}

/// Wait for child `pid` and return `(pid, status)`.
///
/// No options are supported and process groups do not exist, so non-zero
/// `options` and non-positive `pid` are rejected with `EINVAL`.
pub fn sys_waitpid<L>(
    lifecycle: &L,
    curproc: &Arc<Process>,
    pid: Pid,
    options: i32,
) -> SyscallResult<(Pid, i32)>
where
    L: ProcessLifecycle + ?Sized,
{
    if options != 0 || pid <= PROCESS_GROUP_PID {
        return Err(errno::EINVAL);
    }

    match lifecycle.wait(curproc, pid) {
        Ok(status) => Ok((pid, status)),
        Err(ProcError::NotFound(_)) => Err(errno::ECHILD),
        Err(err) => {
            warn!(pid, error = %err, "waitpid failed");
            Err(err.errno())
        }
    }
}

/// Terminate the calling process with `code`
pub fn sys_exit<L>(lifecycle: &L, curproc: &Arc<Process>, code: ExitCode) -> SyscallResult<()>
where
    L: ProcessLifecycle + ?Sized,
{
    lifecycle
        .exit(curproc, mkwait_exit(code))
        .map_err(|err| err.errno())
}
