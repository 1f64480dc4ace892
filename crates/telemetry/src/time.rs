// Path: crates/telemetry/src/time.rs
use std::time::{Duration, Instant};

/// Logs how long a bootstrap stage took when dropped.
#[must_use = "the timer reports when it goes out of scope"]
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    /// Starts timing `stage`.
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }

    /// Time since the timer was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::info!(
            target: "telemetry",
            stage = self.stage,
            elapsed_ms = elapsed.as_millis() as u64,
            "{} took {:?}",
            self.stage,
            elapsed
        );
    }
}
