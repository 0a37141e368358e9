/*!
 * Writer Task
 *
 * Allocate, publish under the writer mutex, then poison and free the
 * displaced version outside the lock. The pre-publish check verifies
 * that the previous writer left a fully initialized payload behind.
 */

use std::sync::Arc;
use std::thread;

use tracing::info;

use super::harness::BenchState;
use crate::core::clock;
use crate::sync::{Payload, PAYLOAD_LIVE, PAYLOAD_POISON};

pub(crate) fn run(state: Arc<BenchState>, ordinal: usize) {
    info!(role = "writer", ordinal, "thread_begin");
    thread::sleep(state.config.startup_delay);

    for _ in 0..state.config.write_outer {
        for _ in 0..state.config.write_inner {
            let start = clock::cycles();

            let mut next = Box::new(Payload::new(PAYLOAD_POISON));

            let guard = state.writer_lock.lock();
            let current = state.provider.safe_read(&state.cell);
            if !current.is_null() {
                // Safety: reclamation only happens through publish under
                // this same mutex, so the pointer cannot be freed while we
                // hold it
                let value = unsafe { (*current).value };
                assert_eq!(
                    value, PAYLOAD_LIVE,
                    "writer {ordinal} found a partially initialized payload"
                );
            }
            next.value = PAYLOAD_LIVE;
            let previous = state.provider.publish(&state.cell, next);
            drop(guard);

            // Reclamation can happen outside the lock
            if let Some(mut previous) = previous {
                previous.value = PAYLOAD_POISON;
                drop(previous);
            }

            let elapsed = clock::cycles().wrapping_sub(start);
            state.writer_slots[ordinal].record(elapsed, 1);

            if !state.config.writer_pause.is_zero() {
                thread::sleep(state.config.writer_pause);
            }
        }
    }

    info!(role = "writer", ordinal, "thread_end");
}
