/*!
 * Harness Orchestrator
 *
 * Spawns the reader and writer populations, waits out the observation
 * window, joins everything, reclaims the final payload, and pools the
 * per-task cycle counts into the two reported averages.
 */

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::info;

use super::config::{BenchConfig, ProviderKind};
use super::timing::TimingSlot;
use super::{reader, writer};
use crate::core::errors::{HarnessError, Result, TaskRole};
use crate::sync::{GraceRcu, RcuSync, RwLockRcu, VersionCell};

/// State shared between the orchestrator and its tasks
pub(crate) struct BenchState {
    pub(crate) config: BenchConfig,
    pub(crate) provider: Arc<dyn RcuSync>,
    pub(crate) cell: VersionCell,
    pub(crate) writer_lock: Mutex<()>,
    pub(crate) reader_slots: Vec<TimingSlot>,
    pub(crate) writer_slots: Vec<TimingSlot>,
}

/// Aggregated results of one run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    /// Pooled mean cycles per read iteration
    pub cycles_per_read: f64,
    /// Pooled mean cycles per write iteration
    pub cycles_per_write: f64,
    /// Read iterations executed across all readers
    pub read_ops: u64,
    /// Write iterations executed across all writers
    pub write_ops: u64,
}

/// Benchmark orchestrator
///
/// Owns the shared cell, the provider, the writer mutex, and the timing
/// slots. Re-runnable: each `run` starts from zeroed slots and an
/// emptied cell.
pub struct Benchmark {
    state: Arc<BenchState>,
}

impl Benchmark {
    /// Build a benchmark for the given configuration
    pub fn new(config: BenchConfig) -> Self {
        let provider: Arc<dyn RcuSync> = match config.provider {
            ProviderKind::Grace => Arc::new(GraceRcu::new()),
            ProviderKind::RwLock => Arc::new(RwLockRcu::new()),
        };
        let reader_slots = (0..config.reader_count).map(|_| TimingSlot::new()).collect();
        let writer_slots = (0..config.writer_count).map(|_| TimingSlot::new()).collect();

        Self {
            state: Arc::new(BenchState {
                config,
                provider,
                cell: VersionCell::new(),
                writer_lock: Mutex::new(()),
                reader_slots,
                writer_slots,
            }),
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.state.config
    }

    /// Execute one full observation run
    pub fn run(&self) -> Result<BenchReport> {
        let state = &self.state;
        for slot in state.reader_slots.iter().chain(state.writer_slots.iter()) {
            slot.reset();
        }

        info!(
            provider = state.provider.name(),
            readers = state.config.reader_count,
            writers = state.config.writer_count,
            "benchmark_begin"
        );

        let mut tasks: Vec<(TaskRole, usize, JoinHandle<()>)> =
            Vec::with_capacity(state.config.reader_count + state.config.writer_count);
        let mut spawn_error = None;

        for ordinal in 0..state.config.reader_count {
            match spawn_task(TaskRole::Reader, ordinal, state) {
                Ok(handle) => tasks.push((TaskRole::Reader, ordinal, handle)),
                Err(error) => {
                    spawn_error = Some(error);
                    break;
                }
            }
        }
        if spawn_error.is_none() {
            for ordinal in 0..state.config.writer_count {
                match spawn_task(TaskRole::Writer, ordinal, state) {
                    Ok(handle) => tasks.push((TaskRole::Writer, ordinal, handle)),
                    Err(error) => {
                        spawn_error = Some(error);
                        break;
                    }
                }
            }
        }

        if spawn_error.is_none() && !state.config.observation_window.is_zero() {
            thread::sleep(state.config.observation_window);
        }

        // Tasks that did start are always drained, even on a failed spawn,
        // so no thread outlives this call
        let mut join_error = None;
        for (role, ordinal, handle) in tasks {
            if handle.join().is_err() && join_error.is_none() {
                join_error = Some(HarnessError::TaskFailed { role, ordinal });
            }
        }

        if let Some(error) = spawn_error {
            return Err(error);
        }
        if let Some(error) = join_error {
            return Err(error);
        }

        // No reader remains past the join barrier; reclaim the last version
        drop(state.cell.take());

        let report = aggregate(state);
        info!(
            cycles_per_read = report.cycles_per_read,
            cycles_per_write = report.cycles_per_write,
            "benchmark_end"
        );
        Ok(report)
    }
}

fn spawn_task(role: TaskRole, ordinal: usize, state: &Arc<BenchState>) -> Result<JoinHandle<()>> {
    let task_state = Arc::clone(state);
    let builder = thread::Builder::new().name(format!("rcu-{role}-{ordinal}"));
    let spawned = match role {
        TaskRole::Reader => builder.spawn(move || reader::run(task_state, ordinal)),
        TaskRole::Writer => builder.spawn(move || writer::run(task_state, ordinal)),
    };
    spawned.map_err(|source| HarnessError::Spawn {
        role,
        ordinal,
        source,
    })
}

fn aggregate(state: &BenchState) -> BenchReport {
    let (read_cycles, read_ops) = pool(&state.reader_slots);
    let (write_cycles, write_ops) = pool(&state.writer_slots);
    BenchReport {
        cycles_per_read: mean(read_cycles, read_ops),
        cycles_per_write: mean(write_cycles, write_ops),
        read_ops,
        write_ops,
    }
}

fn pool(slots: &[TimingSlot]) -> (u64, u64) {
    slots.iter().fold((0, 0), |(cycles, ops), slot| {
        (cycles + slot.cycles(), ops + slot.ops())
    })
}

fn mean(cycles: u64, ops: u64) -> f64 {
    if ops == 0 {
        0.0
    } else {
        cycles as f64 / ops as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_population_is_zero() {
        assert_eq!(mean(0, 0), 0.0);
        assert_eq!(mean(100, 0), 0.0);
    }

    #[test]
    fn test_mean_divides_by_ops() {
        assert_eq!(mean(100, 4), 25.0);
    }

    #[test]
    fn test_new_sizes_slots_from_config() {
        let config = BenchConfig {
            reader_count: 3,
            writer_count: 5,
            ..BenchConfig::quick()
        };
        let benchmark = Benchmark::new(config);
        assert_eq!(benchmark.state.reader_slots.len(), 3);
        assert_eq!(benchmark.state.writer_slots.len(), 5);
        assert!(benchmark.state.cell.is_empty());
    }

    #[test]
    fn test_pool_sums_across_slots() {
        let slots = vec![TimingSlot::new(), TimingSlot::new()];
        slots[0].record(10, 1);
        slots[1].record(30, 3);
        assert_eq!(pool(&slots), (40, 4));
    }
}
