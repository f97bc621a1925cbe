//! One detect → scan → group → render pass.

use crate::config::Settings;
use crate::metrics::MetricsRegistry;
use crate::pipeline::{
    detect_existing, group_by_day, ExclusionSet, ListError, ScanError, Scanner,
};
use crate::render::{DayFailure, Encoder, GenError, Generator, MencoderEncoder};
use crate::scoring::{BrightnessScorer, CommandScorer, ImageScorer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that end a cycle before rendering completes.
///
/// Per-day rendering failures are not cycle errors; they are reported in
/// [`CycleReport::failed`].
#[derive(Debug, Error)]
pub enum CycleError {
    /// The output directory could not be listed.
    #[error("failed to detect existing timelapses: {0}")]
    Detect(#[from] ListError),

    /// Scanning or scoring failed.
    #[error("failed to scan images: {0}")]
    Scan(#[from] ScanError),

    /// Rendering could not start.
    #[error("failed to prepare rendering: {0}")]
    Generate(#[from] GenError),
}

/// Summary of a completed cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Videos found in the output directory.
    pub existing: usize,
    /// Days skipped because they were already rendered.
    pub excluded: usize,
    /// Photos scored.
    pub scored: usize,
    /// Scored photos dropped as too dark.
    pub dark: usize,
    /// Day groups handed to the generator.
    pub groups: usize,
    /// Videos written.
    pub generated: Vec<PathBuf>,
    /// Days that failed to render.
    pub failed: Vec<DayFailure>,
    /// Wall-clock duration of the cycle.
    pub elapsed: Duration,
}

/// Runs update cycles against one image and output directory.
pub struct UpdateCycle {
    settings: Settings,
    scorer: Arc<dyn BrightnessScorer>,
    encoder: Arc<dyn Encoder>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl UpdateCycle {
    /// Creates a cycle with explicit scorer and encoder implementations.
    pub fn new(
        settings: Settings,
        scorer: Arc<dyn BrightnessScorer>,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        Self {
            settings,
            scorer,
            encoder,
            metrics: None,
        }
    }

    /// Creates a cycle using the external programs named in `settings`.
    ///
    /// Falls back to the in-process scorer when no scorer command is set.
    pub fn from_settings(settings: Settings) -> Self {
        let scorer: Arc<dyn BrightnessScorer> = match &settings.scorer_command {
            Some(program) => Arc::new(CommandScorer::new(program.clone())),
            None => Arc::new(ImageScorer::new()),
        };
        let encoder = Arc::new(MencoderEncoder::new(
            settings.encoder_command.clone(),
            settings.fps,
        ));
        Self::new(settings, scorer, encoder)
    }

    /// Records every cycle outcome in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Settings this cycle runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs one full cycle, blocking until every day has been rendered.
    pub fn run(&self) -> Result<CycleReport, CycleError> {
        let result = self.execute();

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(report) => metrics.record_cycle(report),
                Err(_) => metrics.record_failed_cycle(),
            }
        }

        result
    }

    fn execute(&self) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let settings = &self.settings;

        tracing::info!(dir = %settings.out_dir.display(), "Detecting existing timelapses");
        let existing = detect_existing(&settings.out_dir, &settings.container)?;
        let exclusions = ExclusionSet::from_rendered(&existing);
        tracing::info!(
            found = existing.len(),
            excluded = exclusions.len(),
            most_recent = ?exclusions.most_recent(),
            "Done detecting timelapses"
        );

        tracing::info!(dir = %settings.image_dir.display(), "Reading image directory");
        let records = Scanner::new(self.scorer.as_ref())
            .with_mode(settings.scan_mode)
            .with_malformed_policy(settings.on_malformed)
            .scan(&settings.image_dir, &exclusions)?;
        let scored = records.len();
        tracing::info!(images = scored, "Found images");

        let groups = group_by_day(records, settings.brightness_threshold);
        let kept: usize = groups.iter().map(|g| g.records().len()).sum();

        tracing::info!(timelapses = groups.len(), "Generating timelapses");
        let mut generator = Generator::new(self.encoder.as_ref(), settings.container.clone());
        if let Some(root) = &settings.scratch_dir {
            generator = generator.with_scratch_root(root);
        }
        let generation = generator.generate_all(&groups, &settings.image_dir, &settings.out_dir)?;

        Ok(CycleReport {
            existing: existing.len(),
            excluded: exclusions.len(),
            scored,
            dark: scored - kept,
            groups: groups.len(),
            generated: generation.generated,
            failed: generation.failed,
            elapsed: started.elapsed(),
        })
    }
}
