/*!
 * Wait Condition
 *
 * Condition variable bound to a caller-owned parking_lot mutex, with waiter
 * accounting so wakeups can report how many threads were released.
 */

use parking_lot::{Condvar, MutexGuard};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// Blocks threads until the state guarded by an external mutex changes.
///
/// The waiter count is only modified while the guarding mutex is held, so a
/// waker holding the same mutex observes an exact count.
#[derive(Debug, Default)]
pub struct WaitCondition {
    condvar: Condvar,
    waiters: AtomicUsize,
}

impl WaitCondition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block while `condition` holds, re-checking after every wakeup.
    ///
    /// The mutex is released while sleeping and re-acquired before
    /// `condition` is evaluated again.
    pub fn wait_while<T, F>(&self, guard: &mut MutexGuard<'_, T>, mut condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut **guard) {
            self.waiters.fetch_add(1, Ordering::SeqCst);
            self.condvar.wait(guard);
            self.waiters.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Wake every waiter. Call with the guarding mutex held.
    pub fn wake_all(&self) -> WakeResult {
        let count = self.waiters.load(Ordering::SeqCst);
        if count == 0 {
            return WakeResult::NoWaiters;
        }
        self.condvar.notify_all();
        WakeResult::Woken(count)
    }

    /// Number of threads currently blocked
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }
}
