//! Daily Timelapse Library
//!
//! Turns a directory of timestamped photos from a time-lapse camera into
//! one video per calendar day, regenerating only what changed since the
//! last pass.
//!
//! # Architecture
//!
//! Each update cycle follows an explicit data flow:
//!
//! ```text
//! existing outputs → exclusions → scan + score → group by day → render
//!                                     ↓                            ↓
//!                               BrightnessScorer               Encoder
//! ```
//!
//! # Design Principles
//!
//! - **Stateless**: every cycle is recomputed from the filesystem
//! - **Incremental**: days already rendered are skipped, except the most
//!   recent one, which may have been rendered mid-day
//! - **Isolated failures**: one day failing to render never affects another
//! - **Pluggable executors**: scoring and encoding sit behind traits, so the
//!   pipeline runs without subprocesses in tests
//!
//! # Example
//!
//! ```no_run
//! use daily_timelapse::{
//!     pipeline::{detect_existing, group_by_day, ExclusionSet, Scanner, BRIGHTNESS_THRESHOLD},
//!     render::{Generator, MencoderEncoder},
//!     scoring::ImageScorer,
//! };
//! use std::path::Path;
//!
//! let (images, out) = (Path::new("./captures"), Path::new("./timelapses"));
//!
//! let existing = detect_existing(out, "avi").unwrap();
//! let exclusions = ExclusionSet::from_rendered(&existing);
//!
//! let scorer = ImageScorer::new();
//! let records = Scanner::new(&scorer).scan(images, &exclusions).unwrap();
//! let groups = group_by_day(records, BRIGHTNESS_THRESHOLD);
//!
//! let encoder = MencoderEncoder::default();
//! let report = Generator::new(&encoder, "avi")
//!     .generate_all(&groups, images, out)
//!     .unwrap();
//! println!("rendered {} days", report.generated.len());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod cycle;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod scoring;
pub mod server;

#[cfg(test)]
mod testing;

// Re-export commonly used types at crate root
pub use config::{ConfigError, FileConfig, Settings};
pub use cycle::{CycleError, CycleReport, UpdateCycle};
pub use metrics::MetricsRegistry;
pub use pipeline::{DayGroup, ExclusionSet, ImageRecord, Scanner};
pub use render::{Encoder, Generator, MencoderEncoder};
pub use scoring::{BrightnessScorer, CommandScorer, ImageScorer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
