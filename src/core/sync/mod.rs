/*!
 * Synchronization Primitives
 *
 * Wait/notify building blocks used by the process core. Locks themselves
 * come from parking_lot.
 */

mod condvar;

pub use condvar::{WaitCondition, WakeResult};
