/*!
 * Thread Membership
 *
 * Kernel thread handles as seen by the process core. The scheduler owns the
 * threads; the core only records which process each one runs for.
 */

use crate::core::types::{Pid, ThreadId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TID: AtomicU64 = AtomicU64::new(1);

/// A kernel thread and the process it currently belongs to
#[derive(Debug)]
pub struct Thread {
    tid: ThreadId,
    name: String,
    // Lock order: always taken after the owning record's lock
    owner: Mutex<Option<Pid>>,
}

impl Thread {
    /// Create an unattached thread handle
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            tid: NEXT_TID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            owner: Mutex::new(None),
        })
    }

    #[inline]
    pub fn tid(&self) -> ThreadId {
        self.tid
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// PID of the owning process, if attached
    pub fn owner(&self) -> Option<Pid> {
        *self.owner.lock()
    }

    /// Claim the thread for `pid`. Returns the current owner on conflict.
    pub(crate) fn claim(&self, pid: Pid) -> Result<(), Pid> {
        let mut owner = self.owner.lock();
        match *owner {
            Some(current) => Err(current),
            None => {
                *owner = Some(pid);
                Ok(())
            }
        }
    }

    /// Clear the owner if it is still `pid`
    pub(crate) fn release(&self, pid: Pid) -> bool {
        let mut owner = self.owner.lock();
        if *owner == Some(pid) {
            *owner = None;
            true
        } else {
            false
        }
    }
}

/// Threads executing on behalf of one process
#[derive(Debug, Default)]
pub struct ThreadSet {
    threads: Vec<Arc<Thread>>,
}

impl ThreadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, thread: Arc<Thread>) {
        self.threads.push(thread);
    }

    /// Remove by thread id; order of the remaining threads is not kept
    pub fn remove(&mut self, tid: ThreadId) -> Option<Arc<Thread>> {
        let index = self.threads.iter().position(|t| t.tid() == tid)?;
        Some(self.threads.swap_remove(index))
    }

    pub fn drain(&mut self) -> Vec<Arc<Thread>> {
        std::mem::take(&mut self.threads)
    }

    pub fn tids(&self) -> Vec<ThreadId> {
        self.threads.iter().map(|t| t.tid()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
