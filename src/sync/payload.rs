/*!
 * Versioned Payload and Shared Cell
 *
 * `Payload` is the object writers publish and readers observe. A fully
 * published payload always carries `PAYLOAD_LIVE`; writers poison the
 * field before freeing a reclaimed version, so a reader that slips past
 * the provider's grace period trips the invariant check instead of
 * silently reading freed memory.
 */

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Field value of every payload reachable from the cell
pub const PAYLOAD_LIVE: u32 = 8;

/// Field value written into a reclaimed payload right before it is freed
pub const PAYLOAD_POISON: u32 = 0;

/// The versioned object exchanged through the cell
#[derive(Debug)]
pub struct Payload {
    pub value: u32,
}

impl Payload {
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    /// Allocate a payload already carrying the live sentinel
    pub fn live() -> Box<Self> {
        Box::new(Self::new(PAYLOAD_LIVE))
    }

    /// True if the publication invariant holds
    #[inline]
    pub fn is_live(&self) -> bool {
        self.value == PAYLOAD_LIVE
    }
}

/// Single slot holding the current payload version
///
/// Starts empty. The cell provides no coordination of its own: mutation
/// goes through `RcuSync::publish` and reads go through a provider read
/// section. Whatever payload is still installed when the cell drops is
/// reclaimed with it.
#[derive(Debug, Default)]
pub struct VersionCell {
    current: AtomicPtr<Payload>,
}

impl VersionCell {
    pub fn new() -> Self {
        Self {
            current: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Raw load of the current version pointer
    #[inline]
    pub(crate) fn load(&self, order: Ordering) -> *mut Payload {
        self.current.load(order)
    }

    /// Raw swap installing `next`, returning the displaced pointer
    #[inline]
    pub(crate) fn swap(&self, next: *mut Payload, order: Ordering) -> *mut Payload {
        self.current.swap(next, order)
    }

    /// Remove and take ownership of the installed payload, if any
    ///
    /// Only sound once no reader can still hold a reference: after the
    /// orchestrator's join barrier, or in single-threaded contexts.
    pub fn take(&self) -> Option<Box<Payload>> {
        let previous = self.current.swap(ptr::null_mut(), Ordering::AcqRel);
        if previous.is_null() {
            None
        } else {
            // Safety: the pointer came from Box::into_raw at publish time
            // and was just detached from the cell, so this is the only
            // remaining reference
            Some(unsafe { Box::from_raw(previous) })
        }
    }

    /// True if no payload is installed
    pub fn is_empty(&self) -> bool {
        self.current.load(Ordering::Acquire).is_null()
    }
}

impl Drop for VersionCell {
    fn drop(&mut self) {
        drop(self.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_starts_empty() {
        let cell = VersionCell::new();
        assert!(cell.is_empty());
        assert!(cell.take().is_none());
    }

    #[test]
    fn test_take_returns_installed_payload() {
        let cell = VersionCell::new();
        let installed = Box::into_raw(Payload::live());
        assert!(cell.swap(installed, Ordering::AcqRel).is_null());
        assert!(!cell.is_empty());

        let taken = cell.take().expect("payload was installed");
        assert!(taken.is_live());
        assert!(cell.is_empty());
    }

    #[test]
    fn test_swap_displaces_previous() {
        let cell = VersionCell::new();
        let first = Box::into_raw(Box::new(Payload::new(1)));
        let second = Box::into_raw(Box::new(Payload::new(2)));

        cell.swap(first, Ordering::AcqRel);
        let displaced = cell.swap(second, Ordering::AcqRel);
        assert_eq!(displaced, first);

        // Safety: `first` was just displaced and is no longer reachable
        let displaced = unsafe { Box::from_raw(displaced) };
        assert_eq!(displaced.value, 1);
        assert_eq!(cell.take().expect("second still installed").value, 2);
    }

    #[test]
    fn test_payload_liveness() {
        assert!(Payload::live().is_live());
        assert!(!Payload::new(PAYLOAD_POISON).is_live());
    }
}
