/*!
 * Process Cleanup Logic
 * Releasing the resources a record owns
 */

use crate::core::types::Pid;
use crate::process::core::traits::AddressSpace;
use tracing::debug;

/// Deactivate and destroy an address space taken out of a record
pub(crate) fn release_address_space(pid: Pid, space: Option<Box<dyn AddressSpace>>) {
    if let Some(space) = space {
        space.deactivate();
        space.destroy();
        debug!(pid, "Address space released");
    }
}
