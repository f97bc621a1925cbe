//! Scored photo record.

use chrono::{DateTime, Local};
use std::fmt;

/// One photo that passed filtering and was scored.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Filename relative to the image directory.
    filename: String,
    /// Capture time decoded from the filename.
    timestamp: DateTime<Local>,
    /// Brightness score, usually in `[0, 1]`.
    brightness: f64,
}

impl ImageRecord {
    /// Creates a new record.
    pub fn new(filename: impl Into<String>, timestamp: DateTime<Local>, brightness: f64) -> Self {
        Self {
            filename: filename.into(),
            timestamp,
            brightness,
        }
    }

    /// Filename relative to the image directory.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Local capture time.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Brightness score.
    #[inline]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {:.2}",
            self.filename, self.timestamp, self.brightness
        )
    }
}
