/*!
 * Cycle Counter
 *
 * Monotonic elapsed-cycle source for latency accumulation. Reads the TSC
 * directly on x86_64; other targets fall back to a monotonic clock
 * expressed in nanoseconds.
 */

/// Read the cycle counter
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn cycles() -> u64 {
    // Safety: rdtsc has no preconditions, it only reads the timestamp counter
    unsafe { std::arch::x86_64::_rdtsc() }
}

/// Read the cycle counter (monotonic nanoseconds on non-x86_64 targets)
#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub fn cycles() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static BASE: OnceLock<Instant> = OnceLock::new();
    BASE.get_or_init(Instant::now).elapsed().as_nanos() as u64
}
