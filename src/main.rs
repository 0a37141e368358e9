/*!
 * RCU Benchmark - Main Entry Point
 *
 * Runs the reader/writer contention workload over the configured
 * synchronization provider and prints the two pooled latency averages.
 */

use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rcu_bench::{BenchConfig, Benchmark};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = BenchConfig::from_env();
    info!(
        provider = config.provider.as_str(),
        readers = config.reader_count,
        writers = config.writer_count,
        window_secs = config.observation_window.as_secs(),
        "RCU benchmark starting"
    );

    let benchmark = Benchmark::new(config);
    let report = benchmark.run()?;

    println!("Time per read : {} cycles", report.cycles_per_read);
    println!("Time per write : {} cycles", report.cycles_per_write);

    Ok(())
}

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .init();
}
