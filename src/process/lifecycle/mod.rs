/*!
 * Process Lifecycle Management
 * Creation, exit/wait handshake, reaping and destruction
 */

mod builder;
mod cleanup;
mod manager;

pub use builder::ProcessManagerBuilder;
pub use manager::ProcessManager;
