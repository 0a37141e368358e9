/*!
 * Benchmark Configuration
 *
 * Every population size, loop count, and pacing delay of the workload is
 * injectable so tests can run the harness deterministically fast.
 */

use std::time::Duration;

/// Synchronization provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Lock-free provider with a two-phase grace period
    Grace,
    /// Reader-writer-lock reference baseline
    RwLock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Grace => "grace",
            ProviderKind::RwLock => "rwlock",
        }
    }
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Reader task population
    pub reader_count: usize,
    /// Writer task population
    pub writer_count: usize,
    /// Reader outer loop iterations
    pub read_outer: u64,
    /// Reader inner loop iterations
    pub read_inner: u64,
    /// Writer outer loop iterations
    pub write_outer: u64,
    /// Writer inner loop iterations
    pub write_inner: u64,
    /// Delay before a task starts its timed loop
    pub startup_delay: Duration,
    /// Reader-side delay after unregistering, before thread exit
    pub shutdown_delay: Duration,
    /// Writer pacing sleep between iterations
    pub writer_pause: Duration,
    /// How long the orchestrator sleeps before joining
    ///
    /// Advisory pacing only: joins block until every task finishes
    /// regardless, so the window does not bound total runtime.
    pub observation_window: Duration,
    /// Which provider mediates the shared cell
    pub provider: ProviderKind,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            reader_count: 10,
            writer_count: 9,
            read_outer: 2_000,
            read_inner: 100_000,
            write_outer: 10,
            write_inner: 200,
            startup_delay: Duration::from_secs(2),
            shutdown_delay: Duration::from_secs(2),
            writer_pause: Duration::from_micros(1),
            observation_window: Duration::from_secs(10),
            provider: ProviderKind::Grace,
        }
    }
}

impl BenchConfig {
    /// Small deterministic workload for tests
    pub fn quick() -> Self {
        Self {
            reader_count: 4,
            writer_count: 2,
            read_outer: 10,
            read_inner: 500,
            write_outer: 2,
            write_inner: 50,
            startup_delay: Duration::ZERO,
            shutdown_delay: Duration::ZERO,
            writer_pause: Duration::ZERO,
            observation_window: Duration::ZERO,
            provider: ProviderKind::Grace,
        }
    }

    /// Total read iterations per reader task
    pub fn reads_per_task(&self) -> u64 {
        self.read_outer * self.read_inner
    }

    /// Total write iterations per writer task
    pub fn writes_per_task(&self) -> u64 {
        self.write_outer * self.write_inner
    }

    /// Build a configuration from `RCU_BENCH_*` environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.reader_count = env_parse("RCU_BENCH_READERS", config.reader_count);
        config.writer_count = env_parse("RCU_BENCH_WRITERS", config.writer_count);
        config.observation_window = Duration::from_secs(env_parse(
            "RCU_BENCH_WINDOW_SECS",
            config.observation_window.as_secs(),
        ));

        if let Ok(kind) = std::env::var("RCU_BENCH_PROVIDER") {
            match kind.as_str() {
                "grace" => config.provider = ProviderKind::Grace,
                "rwlock" => config.provider = ProviderKind::RwLock,
                other => {
                    tracing::warn!(provider = %other, "Unknown provider, keeping default")
                }
            }
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
