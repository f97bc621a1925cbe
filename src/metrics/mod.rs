//! Prometheus metrics for update cycles.
//!
//! # Metrics Exposed
//!
//! - `timelapse_cycles_total` - Update cycles started
//! - `timelapse_cycles_failed_total` - Update cycles that ended with an error
//! - `timelapse_images_scored_total` - Photos scored
//! - `timelapse_images_dark_total` - Scored photos dropped as too dark
//! - `timelapse_videos_generated_total` - Videos rendered
//! - `timelapse_video_failures_total` - Days whose rendering failed
//! - `timelapse_last_cycle_seconds` - Duration of the last completed cycle
//! - `timelapse_excluded_days` - Days skipped by the last cycle
//!
//! The registry is served on `/metrics` next to the output directory.

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
