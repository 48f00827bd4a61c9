/*!
 * Process Record
 *
 * The per-process control block. Identity (`name`, and `pid` once the table
 * assigned it) never changes; every other field lives behind the record lock.
 * The query surface here is what the system-call layer reads.
 */

use super::core::traits::{AddressSpace, DirectoryHandle};
#[cfg(feature = "console")]
use super::core::traits::DeviceHandle;
use super::core::types::{ProcessInfo, ProcessState};
use super::thread::ThreadSet;
use crate::core::limits::PROC_NO_PID;
use crate::core::sync::WaitCondition;
use crate::core::types::{ExitCode, Pid, ProcessName, ThreadId};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

pub(crate) struct ProcessInner {
    pub(crate) pid: Pid,
    pub(crate) ppid: Option<Pid>,
    pub(crate) state: ProcessState,
    pub(crate) exit_code: Option<ExitCode>,
    // Set by whoever collects the exit code; the record is on its way out
    pub(crate) reaped: bool,
    pub(crate) threads: ThreadSet,
    pub(crate) address_space: Option<Box<dyn AddressSpace>>,
    pub(crate) cwd: Option<Arc<dyn DirectoryHandle>>,
    #[cfg(feature = "console")]
    pub(crate) console: Option<Arc<dyn DeviceHandle>>,
}

/// Process control block
pub struct Process {
    name: ProcessName,
    inner: Mutex<ProcessInner>,
    wait_cv: WaitCondition,
}

impl Process {
    /// Fresh `Running` record with no PID, threads or address space.
    ///
    /// Only the lifecycle manager builds records; they become visible once
    /// the process table assigns a PID.
    pub(crate) fn new(name: &str, cwd: Option<Arc<dyn DirectoryHandle>>) -> Arc<Self> {
        Arc::new(Self {
            name: ProcessName::from(name),
            inner: Mutex::new(ProcessInner {
                pid: PROC_NO_PID,
                ppid: None,
                state: ProcessState::Running,
                exit_code: None,
                reaped: false,
                threads: ThreadSet::new(),
                address_space: None,
                cwd,
                #[cfg(feature = "console")]
                console: None,
            }),
            wait_cv: WaitCondition::new(),
        })
    }

    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, ProcessInner> {
        self.inner.lock()
    }

    #[inline]
    pub(crate) fn wait_condition(&self) -> &WaitCondition {
        &self.wait_cv
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned PID, or `PROC_NO_PID` before registration
    pub fn pid(&self) -> Pid {
        self.lock().pid
    }

    /// Parent PID, `None` for the kernel record and orphans
    pub fn ppid(&self) -> Option<Pid> {
        self.lock().ppid
    }

    pub fn state(&self) -> ProcessState {
        self.lock().state
    }

    /// Exit code; `None` until the process has exited
    pub fn exit_code(&self) -> Option<ExitCode> {
        let inner = self.lock();
        inner.state.is_exited().then_some(inner.exit_code).flatten()
    }

    pub fn thread_count(&self) -> usize {
        self.lock().threads.len()
    }

    pub fn thread_ids(&self) -> Vec<ThreadId> {
        self.lock().threads.tids()
    }

    /// Number of threads blocked in `wait` on this process
    pub fn waiter_count(&self) -> usize {
        self.wait_cv.waiter_count()
    }

    pub fn info(&self) -> ProcessInfo {
        let inner = self.lock();
        ProcessInfo {
            pid: inner.pid,
            ppid: inner.ppid,
            name: self.name.clone(),
            state: inner.state,
            exit_code: inner.exit_code,
            threads: inner.threads.len(),
            has_address_space: inner.address_space.is_some(),
        }
    }

    // =========================================================================
    // Address space
    // =========================================================================

    pub fn address_space_is_set(&self) -> bool {
        self.lock().address_space.is_some()
    }

    /// Run `f` against the current address space while holding the record lock
    pub fn with_address_space<R>(&self, f: impl FnOnce(Option<&dyn AddressSpace>) -> R) -> R {
        let inner = self.lock();
        f(inner.address_space.as_deref())
    }

    /// Install `new` and hand back the previous address space
    pub fn replace_address_space(
        &self,
        new: Option<Box<dyn AddressSpace>>,
    ) -> Option<Box<dyn AddressSpace>> {
        std::mem::replace(&mut self.lock().address_space, new)
    }

    // =========================================================================
    // Working directory
    // =========================================================================

    /// New strong reference to the working directory
    pub fn cwd(&self) -> Option<Arc<dyn DirectoryHandle>> {
        self.lock().cwd.clone()
    }

    /// Install `new` and hand back the previous reference
    pub fn replace_cwd(
        &self,
        new: Option<Arc<dyn DirectoryHandle>>,
    ) -> Option<Arc<dyn DirectoryHandle>> {
        std::mem::replace(&mut self.lock().cwd, new)
    }

    #[cfg(feature = "console")]
    pub fn console(&self) -> Option<Arc<dyn DeviceHandle>> {
        self.lock().console.clone()
    }

    #[cfg(feature = "console")]
    pub fn set_console(&self, console: Option<Arc<dyn DeviceHandle>>) -> Option<Arc<dyn DeviceHandle>> {
        std::mem::replace(&mut self.lock().console, console)
    }

    // =========================================================================
    // Fixture setters
    //
    // These bypass the create/exit/wait state machine and every invariant it
    // maintains. Bootstrap and test fixtures only.
    // =========================================================================

    /// Overwrite the PID. Breaks the table's index if the record is registered.
    pub fn set_pid(&self, pid: Pid) {
        self.lock().pid = pid;
    }

    /// Overwrite the parent PID; `PROC_NO_PID` clears it
    pub fn set_ppid(&self, ppid: Pid) {
        self.lock().ppid = (ppid != PROC_NO_PID).then_some(ppid);
    }

    /// Overwrite the state without waking waiters or touching threads
    pub fn set_state(&self, state: ProcessState) {
        self.lock().state = state;
    }

    /// Overwrite the exit code regardless of state
    pub fn set_exit_code(&self, code: ExitCode) {
        self.lock().exit_code = Some(code);
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Process")
            .field("pid", &inner.pid)
            .field("ppid", &inner.ppid)
            .field("name", &self.name)
            .field("state", &inner.state)
            .field("exit_code", &inner.exit_code)
            .field("threads", &inner.threads.len())
            .finish()
    }
}
