/*!
 * Core Types
 * Common types used across the process core
 */

/// Process ID type (signed, matches the kernel `pid_t`)
pub type Pid = i32;

/// Exit status reported by a process through `exit`
pub type ExitCode = i32;

/// Kernel thread identifier
pub type ThreadId = u64;

/// Process display name, stored inline when short
pub type ProcessName = smartstring::alias::String;
