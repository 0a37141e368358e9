/*!
 * Lock-Free Grace-Period Provider
 *
 * Classic two-phase RCU: each registered reader keeps a cache-padded
 * counter holding a nesting count plus the grace-period phase it entered
 * under. A publisher swaps the cell pointer, flips the global phase twice
 * and spin-waits each flip until every registered reader is either
 * offline or observed past the flip. After that no reader can still
 * reference the displaced version.
 */

use std::cell::RefCell;
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::payload::{Payload, VersionCell};
use super::provider::RcuSync;

/// Nesting increment for one read-section entry
const NEST_ONE: u64 = 1;
/// Low half of the counter holds the nesting depth
const NEST_MASK: u64 = (1 << 32) - 1;
/// Grace-period phase bit
const PHASE: u64 = 1 << 32;

/// Spin iterations between scheduler yields while waiting out a phase
const SPINS_PER_YIELD: u32 = 64;

/// Per-reader counter slot
#[repr(C, align(128))] // Padded to keep reader counters off shared cache lines
struct ReaderSlot {
    ctr: AtomicU64,
}

impl ReaderSlot {
    const fn new() -> Self {
        Self {
            ctr: AtomicU64::new(0),
        }
    }
}

/// Registration handle parked in thread-local storage
///
/// Dropping it marks the reader offline, so a thread that dies inside a
/// read section (the invariant assert) cannot stall every future grace
/// period.
struct Registration {
    slot: Arc<ReaderSlot>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.slot.ctr.store(0, Ordering::SeqCst);
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Registration>> = const { RefCell::new(None) };
}

/// Lock-free RCU provider with a two-phase grace period
pub struct GraceRcu {
    /// Global grace-period counter: phase bit plus a nest seed of one
    gp: AtomicU64,
    /// Serializes grace periods across publishers
    gp_lock: Mutex<()>,
    /// Counters of all currently registered readers
    readers: Mutex<Vec<Arc<ReaderSlot>>>,
}

impl GraceRcu {
    pub fn new() -> Self {
        Self {
            gp: AtomicU64::new(NEST_ONE),
            gp_lock: Mutex::new(()),
            readers: Mutex::new(Vec::new()),
        }
    }

    /// Number of readers currently registered (for diagnostics)
    pub fn registered_readers(&self) -> usize {
        self.readers.lock().len()
    }

    /// Block until no reader can still reference a pre-swap version
    fn synchronize(&self) {
        let _gp = self.gp_lock.lock();
        let readers = self.readers.lock();

        fence(Ordering::SeqCst);
        self.flip_and_wait(readers.as_slice());
        self.flip_and_wait(readers.as_slice());
        fence(Ordering::SeqCst);
    }

    /// Flip the phase bit, then wait out every reader stuck in the old one
    fn flip_and_wait(&self, readers: &[Arc<ReaderSlot>]) {
        let gp = self.gp.fetch_xor(PHASE, Ordering::SeqCst) ^ PHASE;

        for slot in readers {
            let mut spins: u32 = 0;
            while section_ongoing(slot, gp) {
                spins = spins.wrapping_add(1);
                if spins % SPINS_PER_YIELD == 0 {
                    thread::yield_now();
                } else {
                    std::hint::spin_loop();
                }
            }
        }
    }
}

impl Default for GraceRcu {
    fn default() -> Self {
        Self::new()
    }
}

/// True while `slot` sits in a read section opened under the old phase
#[inline]
fn section_ongoing(slot: &ReaderSlot, gp: u64) -> bool {
    let v = slot.ctr.load(Ordering::SeqCst);
    v & NEST_MASK != 0 && (v ^ gp) & PHASE != 0
}

impl RcuSync for GraceRcu {
    fn register_reader(&self) {
        let slot = Arc::new(ReaderSlot::new());
        CURRENT.with(|tls| {
            let mut tls = tls.borrow_mut();
            debug_assert!(tls.is_none(), "thread already registered as a reader");
            *tls = Some(Registration { slot: slot.clone() });
        });
        self.readers.lock().push(slot);
    }

    fn unregister_reader(&self) {
        let registration = CURRENT.with(|tls| tls.borrow_mut().take());
        if let Some(registration) = registration {
            let mut readers = self.readers.lock();
            if let Some(index) = readers
                .iter()
                .position(|slot| Arc::ptr_eq(slot, &registration.slot))
            {
                readers.swap_remove(index);
            }
        }
    }

    fn read_section_enter(&self) {
        CURRENT.with(|tls| {
            let tls = tls.borrow();
            let slot = &tls
                .as_ref()
                .expect("read_section_enter before register_reader")
                .slot;

            let tmp = slot.ctr.load(Ordering::Relaxed);
            if tmp & NEST_MASK == 0 {
                // Outermost entry: snapshot the current phase
                slot.ctr.store(self.gp.load(Ordering::Relaxed), Ordering::Relaxed);
                fence(Ordering::SeqCst);
            } else {
                slot.ctr.store(tmp.wrapping_add(NEST_ONE), Ordering::Relaxed);
            }
        });
    }

    fn read_section_exit(&self) {
        CURRENT.with(|tls| {
            let tls = tls.borrow();
            let slot = &tls
                .as_ref()
                .expect("read_section_exit before register_reader")
                .slot;

            fence(Ordering::SeqCst);
            slot.ctr.fetch_sub(NEST_ONE, Ordering::Relaxed);
        });
    }

    fn safe_read(&self, cell: &VersionCell) -> *const Payload {
        cell.load(Ordering::Acquire)
    }

    fn publish(&self, cell: &VersionCell, next: Box<Payload>) -> Option<Box<Payload>> {
        let previous = cell.swap(Box::into_raw(next), Ordering::SeqCst);
        self.synchronize();
        if previous.is_null() {
            None
        } else {
            // Safety: the grace period just completed, so no read section
            // that could have observed `previous` is still open; ownership
            // reverts to the caller
            Some(unsafe { Box::from_raw(previous) })
        }
    }

    fn name(&self) -> &'static str {
        "grace"
    }
}
