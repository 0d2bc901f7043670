//! Wall-clock sampling for benchmarked calls.

use std::time::{Duration, Instant};

use tracing::warn;

/// Collects one duration sample per `start`/`stop` pair.
#[derive(Debug, Clone)]
pub struct StatisticalTimer {
    label: String,
    started: Option<Instant>,
    samples: Vec<Duration>,
}

impl StatisticalTimer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: None,
            samples: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        match self.started.take() {
            Some(start) => self.samples.push(start.elapsed()),
            None => warn!("timer '{}' stopped without being started", self.label),
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Drop a pending `start` without recording a sample.
    pub fn cancel(&mut self) {
        self.started = None;
    }

    /// Record a sample measured elsewhere.
    pub fn record(&mut self, sample: Duration) {
        self.samples.push(sample);
    }

    pub fn reset(&mut self) {
        self.started = None;
        self.samples.clear();
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    pub fn min(&self) -> Option<Duration> {
        self.samples.iter().min().copied()
    }

    pub fn max(&self) -> Option<Duration> {
        self.samples.iter().max().copied()
    }

    pub fn median(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2)
        } else {
            Some(sorted[mid])
        }
    }

    /// Population standard deviation in seconds.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?.as_secs_f64();
        let var = self
            .samples
            .iter()
            .map(|s| (s.as_secs_f64() - mean).powi(2))
            .sum::<f64>()
            / self.samples.len() as f64;
        Some(var.sqrt())
    }

    /// Mean sample in nanoseconds, 0 when nothing was recorded.
    pub fn time_in_ns(&self) -> f64 {
        self.mean().map_or(0.0, |d| d.as_nanos() as f64)
    }
}
