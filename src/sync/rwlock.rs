/*!
 * Lock-Based Reference Provider
 *
 * Validation baseline: read sections hold the shared side of a
 * reader-writer lock and publish swaps the cell under the exclusive
 * side. Trivially correct, so harness results over it are trustworthy
 * while the lock-free provider is under suspicion.
 */

use std::sync::atomic::Ordering;

use parking_lot::lock_api::RawRwLock as _;
use parking_lot::RawRwLock;

use super::payload::{Payload, VersionCell};
use super::provider::RcuSync;

/// Reader-writer-lock RCU provider
pub struct RwLockRcu {
    raw: RawRwLock,
}

impl RwLockRcu {
    pub fn new() -> Self {
        Self {
            raw: RawRwLock::INIT,
        }
    }
}

impl Default for RwLockRcu {
    fn default() -> Self {
        Self::new()
    }
}

impl RcuSync for RwLockRcu {
    fn register_reader(&self) {}

    fn unregister_reader(&self) {}

    fn read_section_enter(&self) {
        self.raw.lock_shared();
    }

    fn read_section_exit(&self) {
        // Safety: paired with lock_shared in read_section_enter
        unsafe { self.raw.unlock_shared() };
    }

    fn safe_read(&self, cell: &VersionCell) -> *const Payload {
        cell.load(Ordering::Acquire)
    }

    fn publish(&self, cell: &VersionCell, next: Box<Payload>) -> Option<Box<Payload>> {
        self.raw.lock_exclusive();
        let previous = cell.swap(Box::into_raw(next), Ordering::AcqRel);
        // Safety: paired with lock_exclusive above
        unsafe { self.raw.unlock_exclusive() };

        if previous.is_null() {
            None
        } else {
            // Safety: taking the exclusive lock drained every read section
            // that could have observed `previous`, and later sections only
            // see the new version
            Some(unsafe { Box::from_raw(previous) })
        }
    }

    fn name(&self) -> &'static str {
        "rwlock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_publish_returns_previous() {
        let provider = RwLockRcu::new();
        let cell = VersionCell::new();

        assert!(provider.publish(&cell, Box::new(Payload::new(1))).is_none());
        let previous = provider.publish(&cell, Box::new(Payload::new(2)));
        assert_eq!(previous.expect("first version displaced").value, 1);
    }

    #[test]
    fn test_sections_admit_concurrent_readers() {
        let provider = Arc::new(RwLockRcu::new());
        let holding = Arc::new(AtomicBool::new(false));
        let release = Arc::new(AtomicBool::new(false));

        let peer = {
            let provider = provider.clone();
            let holding = holding.clone();
            let release = release.clone();
            thread::spawn(move || {
                provider.read_section_enter();
                holding.store(true, Ordering::Release);
                while !release.load(Ordering::Acquire) {
                    thread::yield_now();
                }
                provider.read_section_exit();
            })
        };

        while !holding.load(Ordering::Acquire) {
            thread::yield_now();
        }

        // Shared side: entering alongside the peer must not block
        provider.read_section_enter();
        provider.read_section_exit();

        release.store(true, Ordering::Release);
        peer.join().unwrap();
    }
}
