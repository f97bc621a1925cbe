//! In-process brightness scorer.
//!
//! Decodes the photo and averages every RGB channel value, scaled by 1/256
//! and rounded to two decimals. External scorers report on the same scale
//! and precision, so a frame near the acceptance threshold is accepted or
//! dropped the same way whichever scorer is configured.

use super::scorer::{BrightnessScorer, ScoreError};
use image::RgbImage;
use std::path::Path;

/// Scores photos by decoding them with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageScorer;

impl ImageScorer {
    /// Creates the scorer.
    pub fn new() -> Self {
        Self
    }

    /// Mean channel intensity of a decoded image, in `[0, 1)`.
    pub fn mean_intensity(image: &RgbImage) -> f64 {
        let samples = image.as_raw();
        if samples.is_empty() {
            return 0.0;
        }

        let total: u64 = samples.iter().map(|&v| u64::from(v)).sum();
        total as f64 / samples.len() as f64 / 256.0
    }

    /// Rounds a score to the two decimals scorers report.
    pub fn round_score(score: f64) -> f64 {
        (score * 100.0).round() / 100.0
    }
}

impl BrightnessScorer for ImageScorer {
    fn score(&self, path: &Path) -> Result<f64, ScoreError> {
        let decoded = image::open(path).map_err(|e| ScoreError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let score = Self::round_score(Self::mean_intensity(&decoded.to_rgb8()));
        tracing::trace!(path = %path.display(), score, "Scored image");
        Ok(score)
    }
}
