/*!
 * System Limits and Constants
 *
 * Identifier space and sentinel values shared by the process core.
 */

use super::types::Pid;

// =============================================================================
// PROCESS IDENTIFIERS
// =============================================================================

/// PID 0 is the process-group sentinel in `waitpid`; never assigned
pub const PROCESS_GROUP_PID: Pid = 0;

/// Lowest assignable PID
pub const MIN_PID: Pid = 1;

/// Exclusive upper bound of the PID space
pub const MAX_PID: Pid = 256;

/// Parent identifier of records that have no parent
pub const PROC_NO_PID: Pid = -1;

/// PID held by the kernel's own record
/// Always the first identifier handed out at bootstrap
pub const KERNEL_PID: Pid = MIN_PID;

/// Number of identifiers in `[MIN_PID, MAX_PID)`
pub const PID_SPACE: usize = (MAX_PID - MIN_PID) as usize;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Display name of the kernel record
pub const KERNEL_PROCESS_NAME: &str = "[kernel]";
