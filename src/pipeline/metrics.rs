// src/pipeline/metrics.rs
//
// Run observability. Counts every transition the pipeline sees and how
// fast ticks are being consumed. Export via logs at end of replay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub ticks_processed: Arc<AtomicU64>,
    pub ticks_rejected: Arc<AtomicU64>,
    pub arrivals: Arc<AtomicU64>,
    pub reappearances: Arc<AtomicU64>,
    pub departures: Arc<AtomicU64>,
    pub evictions: Arc<AtomicU64>,
    pub peak_present: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            ticks_processed: Arc::new(AtomicU64::new(0)),
            ticks_rejected: Arc::new(AtomicU64::new(0)),
            arrivals: Arc::new(AtomicU64::new(0)),
            reappearances: Arc::new(AtomicU64::new(0)),
            departures: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
            peak_present: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Record the current simultaneous-presence count; keeps the maximum.
    pub fn note_present(&self, present: usize) {
        self.peak_present
            .fetch_max(present as u64, Ordering::Relaxed);
    }

    pub fn ticks_per_sec(&self) -> f64 {
        let ticks = self.ticks_processed.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            ticks as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks_processed: self.ticks_processed.load(Ordering::Relaxed),
            ticks_rejected: self.ticks_rejected.load(Ordering::Relaxed),
            arrivals: self.arrivals.load(Ordering::Relaxed),
            reappearances: self.reappearances.load(Ordering::Relaxed),
            departures: self.departures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            peak_present: self.peak_present.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub ticks_processed: u64,
    pub ticks_rejected: u64,
    pub arrivals: u64,
    pub reappearances: u64,
    pub departures: u64,
    pub evictions: u64,
    pub peak_present: u64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_present_keeps_the_maximum() {
        let metrics = PipelineMetrics::new();
        metrics.note_present(2);
        metrics.note_present(5);
        metrics.note_present(3);
        assert_eq!(metrics.summary().peak_present, 5);
    }

    #[test]
    fn counters_accumulate() {
        let metrics = PipelineMetrics::new();
        metrics.inc(&metrics.ticks_processed);
        metrics.inc(&metrics.ticks_processed);
        metrics.add(&metrics.evictions, 3);

        let summary = metrics.summary();
        assert_eq!(summary.ticks_processed, 2);
        assert_eq!(summary.evictions, 3);
    }
}
