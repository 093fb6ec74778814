use std::collections::BTreeMap;
use std::time::Instant;

/// Stage names reported through [`PipelineLogger::timing`].
pub mod stage {
    pub const DETECT: &str = "detect";
    pub const CROP: &str = "crop";
    pub const NORMALIZE: &str = "normalize";
    pub const KMEANS: &str = "kmeans";
    pub const CLASSIFY: &str = "classify";
}

/// Observer for analysis progress, stage timings and counters.
///
/// Keeps the use case free of any particular output mechanism.
pub trait PipelineLogger: Send {
    fn progress(&mut self, current: usize, total: usize);

    /// Duration of one stage for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. For tests and embedders with their own reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
struct Stats {
    count: usize,
    total: f64,
    max: f64,
}

impl Stats {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.max = self.max.max(value);
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Forwards events to the `log` facade and reports per-stage averages.
pub struct LogPipelineLogger {
    timings: BTreeMap<String, Stats>,
    metrics: BTreeMap<String, Stats>,
    start_time: Instant,
    frames_seen: usize,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Mean duration of a stage in milliseconds, if it ever ran.
    pub fn mean_timing(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(Stats::mean)
    }

    /// Sum of all values recorded under `name`.
    pub fn metric_total(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|s| s.total)
    }

    /// Formatted report, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Analysis summary ({} frames, {elapsed_s:.1}s):",
            self.frames_seen
        )];
        for (stage, stats) in &self.timings {
            lines.push(format!(
                "  {stage:10}: avg {:7.2}ms  max {:7.2}ms  runs {}",
                stats.mean(),
                stats.max,
                stats.count
            ));
        }
        for (name, stats) in &self.metrics {
            lines.push(format!("  {name}: total {:.0}  avg {:.2}", stats.total, stats.mean()));
        }
        Some(lines.join("\n"))
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        if total > 0 {
            log::debug!("frame {current}/{total}");
        } else {
            log::debug!("frame {current}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::trace!("{stage}: {duration_ms:.2}ms");
        self.timings
            .entry(stage.to_string())
            .or_default()
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().record(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
