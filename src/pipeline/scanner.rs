//! Image directory scanning and concurrent scoring.

use super::{existing::ExclusionSet, record::ImageRecord, ListError};
use crate::codec::{decode_filename_timestamp, FormatError, IMAGE_EXTENSION};
use crate::scoring::{BrightnessScorer, ScoreError};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that end a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The image directory could not be listed.
    #[error(transparent)]
    List(#[from] ListError),

    /// A `.jpg` name carries no timestamp under [`MalformedPolicy::Fail`].
    #[error("malformed image filename {filename:?}: {source}")]
    Format {
        /// Offending filename.
        filename: String,
        /// Decode failure.
        #[source]
        source: FormatError,
    },

    /// A photo could not be scored.
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// How scoring work is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Score every candidate on the rayon pool.
    #[default]
    Parallel,
    /// Score candidates one after another on the calling thread.
    Sequential,
}

/// What to do with a `.jpg` whose name does not carry a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Abort the scan.
    #[default]
    Fail,
    /// Log a warning and leave the file out.
    Skip,
}

struct Candidate {
    filename: String,
    timestamp: DateTime<Local>,
}

/// Lists an image directory and scores the photos it should consider.
pub struct Scanner<'a> {
    scorer: &'a dyn BrightnessScorer,
    mode: ScanMode,
    malformed: MalformedPolicy,
}

impl<'a> Scanner<'a> {
    /// Creates a parallel scanner that fails on malformed filenames.
    pub fn new(scorer: &'a dyn BrightnessScorer) -> Self {
        Self {
            scorer,
            mode: ScanMode::default(),
            malformed: MalformedPolicy::default(),
        }
    }

    /// Sets how scoring work is dispatched.
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the handling of `.jpg` files without a timestamp name.
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Scores every eligible photo in `image_dir`.
    ///
    /// A photo is eligible when it is a non-empty regular `.jpg` file whose
    /// capture day is not in `exclusions`. The result is sorted ascending by
    /// timestamp (ties broken by filename), whatever the scan mode.
    pub fn scan(
        &self,
        image_dir: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<Vec<ImageRecord>, ScanError> {
        let candidates = self.candidates(image_dir, exclusions)?;

        tracing::info!(
            dir = %image_dir.display(),
            candidates = candidates.len(),
            mode = ?self.mode,
            "Scoring images"
        );

        let mut records: Vec<ImageRecord> = match self.mode {
            ScanMode::Parallel => candidates
                .into_par_iter()
                .map(|c| self.score(image_dir, c))
                .collect::<Result<_, _>>()?,
            ScanMode::Sequential => candidates
                .into_iter()
                .map(|c| self.score(image_dir, c))
                .collect::<Result<_, _>>()?,
        };

        records.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then_with(|| a.filename().cmp(b.filename()))
        });

        Ok(records)
    }

    fn candidates(
        &self,
        image_dir: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<Vec<Candidate>, ScanError> {
        let entries = std::fs::read_dir(image_dir).map_err(|e| ListError::new(image_dir, e))?;
        let mut candidates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ListError::new(image_dir, e))?;
            let path = entry.path();

            // Follows symlinks; a dangling link is skipped.
            let metadata = match std::fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(file = %path.display(), "Skipping dangling link");
                    continue;
                }
                Err(e) => return Err(ListError::new(path, e).into()),
            };

            if !metadata.is_file() || metadata.len() == 0 {
                continue;
            }

            if path.extension().and_then(|ext| ext.to_str()) != Some(IMAGE_EXTENSION) {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().into_owned();
            let timestamp = match decode_filename_timestamp(&filename) {
                Ok(ts) => ts,
                Err(source) => match self.malformed {
                    MalformedPolicy::Fail => {
                        return Err(ScanError::Format { filename, source });
                    }
                    MalformedPolicy::Skip => {
                        tracing::warn!(file = %filename, error = %source, "Skipping malformed image filename");
                        continue;
                    }
                },
            };

            if exclusions.contains(timestamp.date_naive()) {
                tracing::trace!(file = %filename, "Day already rendered");
                continue;
            }

            candidates.push(Candidate {
                filename,
                timestamp,
            });
        }

        Ok(candidates)
    }

    fn score(&self, image_dir: &Path, candidate: Candidate) -> Result<ImageRecord, ScoreError> {
        tracing::trace!(file = %candidate.filename, "Calculating brightness");

        let brightness = self.scorer.score(&image_dir.join(&candidate.filename))?;
        Ok(ImageRecord::new(
            candidate.filename,
            candidate.timestamp,
            brightness,
        ))
    }
}
