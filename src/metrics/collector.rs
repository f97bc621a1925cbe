//! Metrics collection and registry.

use crate::cycle::CycleReport;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for update cycles.
pub struct MetricsRegistry {
    registry: Registry,

    // Cycle metrics
    cycles_total: IntCounter,
    cycles_failed_total: IntCounter,
    last_cycle_seconds: Gauge,
    excluded_days: IntGauge,

    // Scanning metrics
    images_scored_total: IntCounter,
    images_dark_total: IntCounter,

    // Rendering metrics
    videos_generated_total: IntCounter,
    video_failures_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all cycle metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let cycles_total =
            IntCounter::new("timelapse_cycles_total", "Total number of update cycles started")?;
        let cycles_failed_total = IntCounter::new(
            "timelapse_cycles_failed_total",
            "Total number of update cycles that ended with an error",
        )?;
        let last_cycle_seconds = Gauge::new(
            "timelapse_last_cycle_seconds",
            "Duration of the last completed update cycle in seconds",
        )?;
        let excluded_days = IntGauge::new(
            "timelapse_excluded_days",
            "Number of already-rendered days skipped by the last cycle",
        )?;

        let images_scored_total =
            IntCounter::new("timelapse_images_scored_total", "Total number of photos scored")?;
        let images_dark_total = IntCounter::new(
            "timelapse_images_dark_total",
            "Total number of scored photos dropped as too dark",
        )?;

        let videos_generated_total = IntCounter::new(
            "timelapse_videos_generated_total",
            "Total number of timelapse videos rendered",
        )?;
        let video_failures_total = IntCounter::new(
            "timelapse_video_failures_total",
            "Total number of days whose rendering failed",
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(cycles_failed_total.clone()))?;
        registry.register(Box::new(last_cycle_seconds.clone()))?;
        registry.register(Box::new(excluded_days.clone()))?;
        registry.register(Box::new(images_scored_total.clone()))?;
        registry.register(Box::new(images_dark_total.clone()))?;
        registry.register(Box::new(videos_generated_total.clone()))?;
        registry.register(Box::new(video_failures_total.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            cycles_failed_total,
            last_cycle_seconds,
            excluded_days,
            images_scored_total,
            images_dark_total,
            videos_generated_total,
            video_failures_total,
        })
    }

    /// Records a completed cycle.
    pub fn record_cycle(&self, report: &CycleReport) {
        self.cycles_total.inc();
        self.last_cycle_seconds.set(report.elapsed.as_secs_f64());
        self.excluded_days.set(report.excluded as i64);
        self.images_scored_total.inc_by(report.scored as u64);
        self.images_dark_total.inc_by(report.dark as u64);
        self.videos_generated_total
            .inc_by(report.generated.len() as u64);
        self.video_failures_total.inc_by(report.failed.len() as u64);
    }

    /// Records a cycle that ended with an error.
    pub fn record_failed_cycle(&self) {
        self.cycles_total.inc();
        self.cycles_failed_total.inc();
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
