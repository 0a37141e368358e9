/*!
 * RCU Benchmark Harness Library
 * Correctness and latency measurement for RCU-style pointer publication
 */

pub mod bench;
pub mod core;
pub mod sync;

// Re-exports
pub use crate::bench::{BenchConfig, BenchReport, Benchmark, ProviderKind};
pub use crate::core::clock::cycles;
pub use crate::core::errors::{HarnessError, Result, TaskRole};
pub use crate::sync::{
    GraceRcu, Payload, RcuSync, RwLockRcu, VersionCell, PAYLOAD_LIVE, PAYLOAD_POISON,
};
