/*!
 * Process Table
 *
 * Bounded registry of live and zombie records keyed by PID, owning PID
 * allocation.
 *
 * # Locking
 *
 * The table lock is held only around structural changes and lookups and is
 * never held while a record lock is taken. Parent and child fields are read
 * after the table lock is released; `add` re-checks the parent once the new
 * record is visible, so a child never outlives an exited parent unnoticed.
 */

use super::core::types::{ProcessInfo, ProcessState};
use super::pid::PidBitmap;
use super::record::Process;
use crate::core::errors::{fatal, ProcError, ProcResult};
use crate::core::limits::PROC_NO_PID;
use crate::core::sync::WaitCondition;
use crate::core::types::Pid;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

struct TableInner {
    pids: PidBitmap,
    records: HashMap<Pid, Arc<Process>, RandomState>,
}

pub struct ProcessTable {
    inner: Mutex<TableInner>,
    // Signalled whenever a record leaves the table
    drained: WaitCondition,
}

/// PID of `parent`, provided it has not exited
fn live_parent(parent: &Process) -> ProcResult<Pid> {
    let parent = parent.lock();
    if parent.state.is_exited() {
        return Err(ProcError::InvalidState {
            pid: parent.pid,
            state: parent.state,
        });
    }
    Ok(parent.pid)
}

impl ProcessTable {
    /// Empty table handing out at most `pid_limit` identifiers
    pub fn bootstrap(pid_limit: usize) -> Self {
        let pids = PidBitmap::new(pid_limit);
        debug!(pid_limit = pids.limit(), "Process table initialized");
        Self {
            inner: Mutex::new(TableInner {
                records: HashMap::with_capacity_and_hasher(pids.limit(), RandomState::new()),
                pids,
            }),
            drained: WaitCondition::new(),
        }
    }

    /// Register `record` under the lowest free PID, as a child of `parent`.
    ///
    /// Fails with `ResourceExhausted` when every PID is taken and with
    /// `InvalidState` when the parent has already exited. The table is left
    /// untouched on failure; a record withdrawn because its parent exited
    /// mid-registration is left `Exited` so nothing can wait on it.
    pub fn add(&self, record: &Arc<Process>, parent: Option<&Arc<Process>>) -> ProcResult<Pid> {
        let registered = record.pid();
        if registered != PROC_NO_PID {
            fatal(ProcError::InvariantViolation(format!(
                "record already registered as pid {registered}"
            )));
        }

        let ppid = parent.map(|parent| live_parent(parent)).transpose()?;
        let pid = self.reserve_pid(record)?;
        {
            let mut inner = record.lock();
            inner.pid = pid;
            inner.ppid = ppid;
        }
        let live = {
            let mut table = self.inner.lock();
            table.records.insert(pid, Arc::clone(record));
            table.records.len()
        };

        // The parent may have exited and scanned its children before the
        // insert above; back out instead of leaving an unowned child.
        if let Some(Err(err)) = parent.map(|parent| live_parent(parent)) {
            self.remove(record)?;
            {
                let mut inner = record.lock();
                inner.pid = PROC_NO_PID;
                inner.ppid = None;
                inner.state = ProcessState::Exited;
                inner.reaped = true;
            }
            record.wait_condition().wake_all();
            debug!(pid, error = %err, "Registration withdrawn, parent exited");
            return Err(err);
        }

        debug!(pid, ?ppid, name = record.name(), live, "Process registered");
        Ok(pid)
    }

    fn reserve_pid(&self, record: &Process) -> ProcResult<Pid> {
        let mut table = self.inner.lock();
        table.pids.alloc().ok_or_else(|| {
            let err = ProcError::ResourceExhausted {
                live: table.records.len(),
                limit: table.pids.limit(),
            };
            warn!(name = record.name(), error = %err, "PID allocation failed");
            err
        })
    }

    /// Drop `record` from the table and free its PID
    pub fn remove(&self, record: &Arc<Process>) -> ProcResult<()> {
        let pid = record.pid();
        let mut table = self.inner.lock();

        match table.records.get(&pid) {
            Some(current) if Arc::ptr_eq(current, record) => {}
            _ => return Err(ProcError::NotFound(pid)),
        }
        table.records.remove(&pid);
        table.pids.release(pid);
        self.drained.wake_all();

        debug!(pid, live = table.records.len(), "Process unregistered");
        Ok(())
    }

    pub fn lookup(&self, pid: Pid) -> ProcResult<Arc<Process>> {
        self.inner
            .lock()
            .records
            .get(&pid)
            .cloned()
            .ok_or(ProcError::NotFound(pid))
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.inner.lock().records.contains_key(&pid)
    }

    /// Whether this exact record is registered
    pub fn contains_record(&self, record: &Arc<Process>) -> bool {
        self.inner
            .lock()
            .records
            .values()
            .any(|r| Arc::ptr_eq(r, record))
    }

    /// Records whose parent is `ppid`
    pub fn children_of(&self, ppid: Pid) -> Vec<Arc<Process>> {
        let records: Vec<Arc<Process>> = self.inner.lock().records.values().cloned().collect();
        records
            .into_iter()
            .filter(|r| r.ppid() == Some(ppid))
            .collect()
    }

    /// All registered records, ordered by PID
    pub fn records(&self) -> Vec<Arc<Process>> {
        let mut records: Vec<(Pid, Arc<Process>)> = self
            .inner
            .lock()
            .records
            .iter()
            .map(|(pid, r)| (*pid, Arc::clone(r)))
            .collect();
        records.sort_unstable_by_key(|(pid, _)| *pid);
        records.into_iter().map(|(_, r)| r).collect()
    }

    pub fn snapshot(&self) -> Vec<ProcessInfo> {
        self.records().iter().map(|r| r.info()).collect()
    }

    /// Live plus zombie record count
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pid_limit(&self) -> usize {
        self.inner.lock().pids.limit()
    }

    /// Block until at most `count` records remain registered
    pub fn wait_until_at_most(&self, count: usize) {
        let mut table = self.inner.lock();
        self.drained
            .wait_while(&mut table, |table| table.records.len() > count);
    }
}
