/*!
 * Process Module
 * Process records, the process table and lifecycle management
 */

pub mod core;
pub mod lifecycle;
pub mod pid;
pub mod record;
pub mod table;
pub mod thread;

// Re-export for convenience
pub use self::core::{AddressSpace, DirectoryHandle, ProcessInfo, ProcessLifecycle, ProcessState};
#[cfg(feature = "console")]
pub use self::core::DeviceHandle;
pub use lifecycle::{ProcessManager, ProcessManagerBuilder};
pub use pid::PidBitmap;
pub use record::Process;
pub use table::ProcessTable;
pub use thread::{Thread, ThreadSet};
