/*!
 * Core Module
 * Fundamental types, limits, errors and synchronization
 */

pub mod errors;
pub mod limits;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use limits::*;
pub use types::*;
