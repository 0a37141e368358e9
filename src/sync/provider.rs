/*!
 * Synchronization Provider Contract
 *
 * The surface the harness exercises: read-side critical-section
 * bracketing, a safe accessor, publish-and-retrieve-previous, and reader
 * thread (un)registration for provider housekeeping.
 */

use super::payload::{Payload, VersionCell};

/// RCU-style synchronization provider
///
/// The harness only frees payloads a provider has handed back from
/// `publish`, so a correct provider guarantees that no reader ever
/// dereferences freed memory. An incorrect one is exactly what the
/// harness exists to expose.
///
/// Thread contract: a thread is registered with at most one provider at a
/// time, and `unregister_reader` must not be called while a read section
/// is open.
pub trait RcuSync: Send + Sync {
    /// Register the calling thread as a reader
    ///
    /// Called once before the thread's first read section and paired with
    /// `unregister_reader` after its last.
    fn register_reader(&self);

    /// Unregister the calling thread
    fn unregister_reader(&self);

    /// Enter a read-side critical section
    ///
    /// Non-blocking for lock-free providers.
    fn read_section_enter(&self);

    /// Leave the read-side critical section
    fn read_section_exit(&self);

    /// Current payload pointer, possibly null
    ///
    /// The pointer stays valid until the enclosing read section exits.
    /// Dereferencing it outside a section is undefined unless the caller
    /// excludes reclamation some other way, as the writer path does under
    /// its mutex.
    fn safe_read(&self, cell: &VersionCell) -> *const Payload;

    /// Install `next` and return the previous payload, exclusively owned
    ///
    /// Returns only once no reader registered with this provider can
    /// still reference the previous version. Concurrent publishers must
    /// be serialized by the caller.
    fn publish(&self, cell: &VersionCell, next: Box<Payload>) -> Option<Box<Payload>>;

    /// Provider name for reports and logs
    fn name(&self) -> &'static str;
}
