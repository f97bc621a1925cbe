//! Test doubles and fixtures shared by module tests.

use crate::codec::encode_filename_timestamp;
use crate::render::{Encoder, GenError};
use crate::scoring::{BrightnessScorer, ScoreError};
use chrono::{DateTime, Local, TimeZone};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scorer answering from a filename table.
#[derive(Debug, Default)]
pub struct TableScorer {
    scores: HashMap<String, f64>,
    default: f64,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl TableScorer {
    pub fn uniform(score: f64) -> Self {
        Self {
            default: score,
            ..Default::default()
        }
    }

    pub fn with_score(mut self, filename: &str, score: f64) -> Self {
        self.scores.insert(filename.to_string(), score);
        self
    }

    pub fn failing_on(mut self, filename: &str) -> Self {
        self.failing.insert(filename.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BrightnessScorer for TableScorer {
    fn score(&self, path: &Path) -> Result<f64, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.failing.contains(&name) {
            return Err(ScoreError::Unparsable {
                path: path.to_path_buf(),
                output: "Traceback".to_string(),
            });
        }

        Ok(self.scores.get(&name).copied().unwrap_or(self.default))
    }
}

/// Encoder that copies the manifest into the output file.
#[derive(Debug, Default)]
pub struct StubEncoder {
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl StubEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every manifest whose stem is `day_key`.
    pub fn failing_on(mut self, day_key: &str) -> Self {
        self.failing.insert(day_key.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Encoder for StubEncoder {
    fn encode(&self, manifest: &Path, output: &Path) -> Result<(), GenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = manifest
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.failing.contains(&stem) {
            return Err(GenError::Failed {
                output: output.to_path_buf(),
                code: Some(1),
                diagnostics: "forced failure".to_string(),
            });
        }

        std::fs::copy(manifest, output).map_err(|source| GenError::Manifest {
            path: manifest.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

/// Writes a non-empty photo captured at `time`, returning its filename.
pub fn write_photo(dir: &Path, time: DateTime<Local>) -> String {
    let name = encode_filename_timestamp(&time);
    std::fs::write(dir.join(&name), b"jpeg").unwrap();
    name
}

/// Writes 31 photos over two days and returns a scorer for them.
///
/// 2017-07-23 has 16 hourly photos (05:00-20:00), 2017-07-24 has 15
/// (05:00-19:00). Photos at 05:00, 06:00 and 20:00 are dark, leaving 13
/// usable photos per day.
pub fn two_day_fixture(dir: &Path) -> TableScorer {
    let mut scorer = TableScorer::uniform(0.5);

    for (day, last_hour) in [(23, 20), (24, 19)] {
        for hour in 5..=last_hour {
            let time = Local.with_ymd_and_hms(2017, 7, day, hour, 0, 0).unwrap();
            let name = write_photo(dir, time);
            if hour < 7 || hour >= 20 {
                scorer = scorer.with_score(&name, 0.1);
            }
        }
    }

    scorer
}
