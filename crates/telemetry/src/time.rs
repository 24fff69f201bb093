// Path: crates/telemetry/src/time.rs
use std::time::{Duration, Instant};

/// Logs the elapsed time of a named phase when dropped.
pub struct Timer {
    phase: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(phase: &'static str) -> Self {
        Self {
            phase,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::info!(
            target: "ggpk::timing",
            phase = self.phase,
            elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0,
            "phase finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let timer = Timer::new("test");
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() > first);
    }
}
