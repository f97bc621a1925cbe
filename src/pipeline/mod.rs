//! Incremental grouping pipeline.
//!
//! ```text
//! existing outputs → exclusion set → scan (filter + score) → group by day
//! ```
//!
//! Everything here is derived from the filesystem on every cycle; nothing is
//! persisted between cycles.

mod existing;
mod grouper;
mod record;
mod scanner;

pub use existing::{detect_existing, ExclusionSet};
pub use grouper::{group_by_day, DayGroup, BRIGHTNESS_THRESHOLD};
pub use record::ImageRecord;
pub use scanner::{MalformedPolicy, ScanError, ScanMode, Scanner};

use std::path::PathBuf;
use thiserror::Error;

/// A directory could not be listed.
#[derive(Debug, Error)]
#[error("failed to list directory {}: {source}", .path.display())]
pub struct ListError {
    /// Directory that was being listed.
    pub path: PathBuf,
    /// Listing failure.
    #[source]
    pub source: std::io::Error,
}

impl ListError {
    pub(crate) fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
