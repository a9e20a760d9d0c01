use std::time::{Duration, Instant};

use serde::Serialize;

/// Wall-clock time spent in each stage of one scoring run, in milliseconds.
///
/// Rules and anomaly run concurrently, so their sum may exceed `total_ms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub features_ms: f64,
    pub rules_ms: f64,
    pub anomaly_ms: f64,
    pub aggregate_ms: f64,
    pub stats_ms: f64,
    pub total_ms: f64,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Start/stop timer for one stage.
pub struct StageTimer {
    start: Instant,
}

impl StageTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds since `start`.
    pub fn finish(self) -> f64 {
        millis(self.start.elapsed())
    }
}

/// Run `f` and return its output with the elapsed milliseconds.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let timer = StageTimer::start();
    let out = f();
    (out, timer.finish())
}
