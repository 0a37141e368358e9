/*!
 * RCU Synchronization
 *
 * The shared versioned cell, the provider contract that protects it, and
 * two provider implementations:
 * - `GraceRcu`: lock-free read sections with a two-phase grace period
 * - `RwLockRcu`: lock-based reference baseline
 */

mod grace;
mod payload;
mod provider;
mod rwlock;

// Re-export public API
pub use grace::GraceRcu;
pub use payload::{Payload, VersionCell, PAYLOAD_LIVE, PAYLOAD_POISON};
pub use provider::RcuSync;
pub use rwlock::RwLockRcu;
