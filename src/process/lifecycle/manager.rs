/*!
 * Process Lifecycle Manager
 *
 * Creates, exits, reaps and destroys process records.
 *
 * # Exit/wait handshake
 *
 * `exit` publishes the exit code and the `Exited` state under the record
 * lock and wakes the record's wait condition before releasing it. `wait`
 * checks the state under the same lock, so a parent either sees the zombie
 * immediately or is parked before the wakeup can happen. Whoever collects
 * the exit code marks the record reaped under that lock, which makes reaping
 * happen exactly once.
 *
 * # Orphans
 *
 * When a process exits its children lose their parent (`ppid` becomes
 * `None`); children that are already zombies are reaped on the spot. A
 * parentless process that exits is reaped by `exit` itself, since nobody can
 * ever wait for it. Every zombie is therefore eventually removed.
 */

use super::builder::ProcessManagerBuilder;
use super::cleanup::release_address_space;
use crate::core::errors::{fatal, ProcError, ProcResult};
use crate::core::types::{ExitCode, Pid};
use crate::monitoring::span_operation;
use crate::process::core::traits::ProcessLifecycle;
use crate::process::core::types::{ProcessInfo, ProcessState};
use crate::process::record::Process;
use crate::process::table::ProcessTable;
use crate::process::thread::Thread;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ProcessManager {
    table: ProcessTable,
    kproc: Arc<Process>,
}

impl ProcessManager {
    /// Bootstrap with default limits
    pub fn bootstrap() -> Self {
        ProcessManagerBuilder::new().build()
    }

    /// Create a builder for constructing a ProcessManager
    pub fn builder() -> ProcessManagerBuilder {
        ProcessManagerBuilder::new()
    }

    pub(super) fn from_parts(table: ProcessTable, kproc: Arc<Process>) -> Self {
        Self { table, kproc }
    }

    /// The kernel's own record
    #[inline]
    pub fn kproc(&self) -> &Arc<Process> {
        &self.kproc
    }

    #[inline]
    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a `Running` record as a child of `parent`.
    ///
    /// The working directory is inherited from `parent`, or from the kernel
    /// record when there is none. The caller attaches at least one thread
    /// before the process can run.
    pub fn create(&self, name: &str, parent: Option<&Arc<Process>>) -> ProcResult<Arc<Process>> {
        let cwd = parent.unwrap_or(&self.kproc).cwd();
        let record = Process::new(name, cwd);

        match self.table.add(&record, parent) {
            Ok(pid) => {
                info!(pid, ppid = ?record.ppid(), name, "Created process");
                Ok(record)
            }
            Err(err) => {
                warn!(name, error = %err, "Process creation failed");
                self.destroy(&record);
                Err(err)
            }
        }
    }

    /// Create a parentless record for a program started by the kernel.
    ///
    /// Nobody waits on such a process; it is reaped as soon as it exits. Use
    /// `wait_for_user_processes` to block until they are all gone.
    pub fn create_runprogram(&self, name: &str) -> ProcResult<Arc<Process>> {
        self.create(name, None)
    }

    // =========================================================================
    // Exit / wait
    // =========================================================================

    /// Transition `process` to `Exited` with `code` and wake its waiters.
    ///
    /// Threads still attached are detached and the address space is
    /// released. The record stays in the table as a zombie until its parent
    /// waits for it, unless it has no parent, in which case it is reaped here.
    pub fn exit(&self, process: &Arc<Process>, code: ExitCode) -> ProcResult<()> {
        if Arc::ptr_eq(process, &self.kproc) {
            fatal(ProcError::InvariantViolation(
                "kernel process cannot exit".to_string(),
            ));
        }

        let (pid, self_reap, space) = {
            let mut inner = process.lock();
            let op = span_operation("exit", inner.pid);
            let _entered = op.span().enter();

            if inner.state.is_exited() {
                let err = ProcError::InvalidState {
                    pid: inner.pid,
                    state: inner.state,
                };
                op.record_error(&err);
                return Err(err);
            }

            inner.exit_code = Some(code);
            inner.state = ProcessState::Exited;

            let pid = inner.pid;
            for thread in inner.threads.drain() {
                thread.release(pid);
            }

            let self_reap = inner.ppid.is_none();
            if self_reap {
                inner.reaped = true;
            }
            let space = inner.address_space.take();

            let woken = process.wait_condition().wake_all();
            info!(pid, exit_code = code, waiters = woken.count(), "Process exited");
            (pid, self_reap, space)
        };

        release_address_space(pid, space);
        self.orphan_children(pid);

        if self_reap {
            self.reap(process)?;
        }
        Ok(())
    }

    /// Block until child `pid` of `parent` exits, then reap it.
    ///
    /// Returns the child's exit code. Fails with `NotFound` when `pid` does
    /// not name a child of `parent`, or when the child was already reaped.
    pub fn wait(&self, parent: &Arc<Process>, pid: Pid) -> ProcResult<ExitCode> {
        let parent_pid = parent.pid();
        let op = span_operation("wait", pid);
        let _entered = op.span().enter();

        let child = self.table.lookup(pid).inspect_err(|err| op.record_error(err))?;

        let code = {
            let mut inner = child.lock();
            if inner.ppid != Some(parent_pid) || inner.reaped {
                debug!(pid, parent = parent_pid, "Wait target is not a child");
                return Err(ProcError::NotFound(pid));
            }

            child
                .wait_condition()
                .wait_while(&mut inner, |inner| inner.state.is_running());

            // Orphaned or collected by another waiter while we slept
            if inner.reaped || inner.ppid != Some(parent_pid) {
                return Err(ProcError::NotFound(pid));
            }
            inner.reaped = true;

            let exit_code = inner.exit_code;
            match exit_code {
                Some(code) => code,
                None => {
                    drop(inner);
                    fatal(ProcError::InvariantViolation(format!(
                        "process {pid} exited without an exit code"
                    )));
                }
            }
        };

        self.reap(&child)?;
        info!(pid, parent = parent_pid, exit_code = code, "Reaped child");
        Ok(code)
    }

    /// Release everything a record owns.
    ///
    /// The record must already be out of the table and have no threads;
    /// anything else is a fatal invariant violation.
    pub fn destroy(&self, process: &Arc<Process>) {
        if self.table.contains_record(process) {
            fatal(ProcError::InvariantViolation(format!(
                "destroying registered process {}",
                process.pid()
            )));
        }

        let mut inner = process.lock();
        if !inner.threads.is_empty() {
            let (pid, count) = (inner.pid, inner.threads.len());
            drop(inner);
            fatal(ProcError::InvariantViolation(format!(
                "destroying process {pid} with {count} attached threads"
            )));
        }

        let pid = inner.pid;
        let space = inner.address_space.take();
        let cwd = inner.cwd.take();
        #[cfg(feature = "console")]
        let console = inner.console.take();
        drop(inner);

        release_address_space(pid, space);
        drop(cwd);
        #[cfg(feature = "console")]
        drop(console);
        debug!(pid, name = process.name(), "Process destroyed");
    }

    fn reap(&self, process: &Arc<Process>) -> ProcResult<()> {
        self.table.remove(process).inspect_err(|err| {
            warn!(pid = process.pid(), error = %err, "Reaped process missing from table");
        })?;
        self.destroy(process);
        Ok(())
    }

    fn orphan_children(&self, ppid: Pid) {
        let mut zombies = Vec::new();
        for child in self.table.children_of(ppid) {
            let mut inner = child.lock();
            if inner.ppid != Some(ppid) {
                continue;
            }
            inner.ppid = None;
            if inner.state.is_exited() && !inner.reaped {
                inner.reaped = true;
                drop(inner);
                zombies.push(child);
            }
        }

        for zombie in zombies {
            if self.reap(&zombie).is_ok() {
                debug!(pid = zombie.pid(), parent = ppid, "Reaped orphaned zombie");
            }
        }
    }

    // =========================================================================
    // Threads
    // =========================================================================

    /// Attach `thread` to `process`.
    ///
    /// Fails with `AlreadyAssigned` if the thread belongs to any process, and
    /// with `InvalidState` if `process` has exited.
    pub fn attach(&self, process: &Arc<Process>, thread: &Arc<Thread>) -> ProcResult<()> {
        let mut inner = process.lock();
        if inner.state.is_exited() {
            return Err(ProcError::InvalidState {
                pid: inner.pid,
                state: inner.state,
            });
        }

        thread
            .claim(inner.pid)
            .map_err(|owner| ProcError::AlreadyAssigned {
                tid: thread.tid(),
                owner,
            })?;
        inner.threads.insert(Arc::clone(thread));

        debug!(pid = inner.pid, tid = thread.tid(), "Thread attached");
        Ok(())
    }

    /// Detach `thread` from whichever process it belongs to.
    ///
    /// Does nothing for an unattached thread, including one whose process
    /// exited and already let go of it. Never triggers `exit`.
    pub fn detach(&self, thread: &Arc<Thread>) -> ProcResult<()> {
        let Some(pid) = thread.owner() else {
            return Ok(());
        };
        let process = self.table.lookup(pid)?;

        let mut inner = process.lock();
        if inner.threads.remove(thread.tid()).is_some() {
            thread.release(pid);
            debug!(pid, tid = thread.tid(), remaining = inner.threads.len(), "Thread detached");
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn lookup(&self, pid: Pid) -> ProcResult<Arc<Process>> {
        self.table.lookup(pid)
    }

    pub fn list_processes(&self) -> Vec<ProcessInfo> {
        self.table.snapshot()
    }

    /// Number of registered records other than the kernel's
    pub fn user_process_count(&self) -> usize {
        self.table.len().saturating_sub(1)
    }

    /// Block until only the kernel record remains
    pub fn wait_for_user_processes(&self) {
        self.table.wait_until_at_most(1);
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl ProcessLifecycle for ProcessManager {
    fn create(&self, name: &str, parent: Option<&Arc<Process>>) -> ProcResult<Arc<Process>> {
        ProcessManager::create(self, name, parent)
    }

    fn exit(&self, process: &Arc<Process>, code: ExitCode) -> ProcResult<()> {
        ProcessManager::exit(self, process, code)
    }

    fn wait(&self, parent: &Arc<Process>, pid: Pid) -> ProcResult<ExitCode> {
        ProcessManager::wait(self, parent, pid)
    }

    fn lookup(&self, pid: Pid) -> ProcResult<Arc<Process>> {
        ProcessManager::lookup(self, pid)
    }

    fn list_processes(&self) -> Vec<ProcessInfo> {
        ProcessManager::list_processes(self)
    }
}
