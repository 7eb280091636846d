//! Call timing
//!
//! Logs how long service calls take on a dedicated target so their verbosity
//! can be tuned separately from the rest of the crate.

use std::time::Instant;

use tracing::debug;

/// Log target used for timing output.
pub const PERF_TARGET: &str = "bucket_audit::perf";

/// Runs `f` and logs its elapsed time under `name` at debug level.
pub fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    let run = start.elapsed();
    debug!(
        target: PERF_TARGET,
        "Finished '{}' in {:.4} seconds",
        name,
        run.as_secs_f64()
    );
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_value() {
        assert_eq!(timed("add", || 2 + 2), 4);
    }

    #[test]
    fn test_timed_passes_errors_through() {
        let result: Result<(), &str> = timed("fail", || Err("boom"));
        assert_eq!(result, Err("boom"));
    }
}
