//! Non-blocking timing instrumentation.
//!
//! Timers only measure and report; nothing here aborts or budgets work.

use std::time::Instant;

use tracing::debug;

/// Measures elapsed wall-clock time for a labelled operation.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    label: String,
    started: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Milliseconds since the stopwatch started.
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Stops the stopwatch, emits a debug event and returns the elapsed milliseconds.
    pub fn finish(self) -> f64 {
        let elapsed_ms = self.elapsed_ms();
        debug!(operation = %self.label, elapsed_ms, "Operation timed");
        elapsed_ms
    }
}

/// Runs `f` and returns its output with the elapsed milliseconds.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> (T, f64) {
    let stopwatch = Stopwatch::start(label);
    let output = f();
    (output, stopwatch.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_output() {
        let (value, elapsed) = timed("sum", || (1..=10).sum::<i32>());
        assert_eq!(value, 55);
        assert!(elapsed >= 0.0);
    }

    #[test]
    fn test_stopwatch_is_monotonic() {
        let stopwatch = Stopwatch::start("work");
        let first = stopwatch.elapsed_ms();
        let second = stopwatch.elapsed_ms();
        assert!(second >= first);
        assert_eq!(stopwatch.label(), "work");
    }
}
