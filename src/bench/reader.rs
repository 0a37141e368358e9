/*!
 * Reader Task
 *
 * Enter a read section, dereference the cell, check the payload
 * invariant, leave. The assert is the product: it only fires when the
 * provider let a version be reclaimed while this reader could still
 * observe it.
 */

use std::sync::Arc;
use std::thread;

use tracing::info;

use super::harness::BenchState;
use crate::core::clock;
use crate::sync::PAYLOAD_LIVE;

pub(crate) fn run(state: Arc<BenchState>, ordinal: usize) {
    info!(role = "reader", ordinal, "thread_begin");
    thread::sleep(state.config.startup_delay);

    state.provider.register_reader();

    let mut executed: u64 = 0;
    let start = clock::cycles();
    for _ in 0..state.config.read_outer {
        for _ in 0..state.config.read_inner {
            state.provider.read_section_enter();
            let current = state.provider.safe_read(&state.cell);
            if !current.is_null() {
                // Safety: the pointer stays valid until read_section_exit
                let value = unsafe { (*current).value };
                assert_eq!(
                    value, PAYLOAD_LIVE,
                    "reader {ordinal} observed a reclaimed payload"
                );
            }
            state.provider.read_section_exit();
            executed += 1;
        }
    }
    let elapsed = clock::cycles().wrapping_sub(start);

    state.provider.unregister_reader();
    state.reader_slots[ordinal].record(elapsed, executed);

    thread::sleep(state.config.shutdown_delay);
    info!(role = "reader", ordinal, "thread_end");
}
