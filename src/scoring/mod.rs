//! Brightness scoring of individual photos.
//!
//! A score is the mean pixel intensity scaled to roughly `[0, 1]`. Photos
//! taken at night score low and are later dropped by the day grouper.
//! Scoring sits behind the [`BrightnessScorer`] trait so the pipeline can run
//! against an external program, the in-process decoder, or a test double.

mod native;
mod scorer;

pub use native::ImageScorer;
pub use scorer::{BrightnessScorer, CommandScorer, ScoreError};
