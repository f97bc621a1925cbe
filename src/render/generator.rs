//! Per-day manifest writing and concurrent rendering.

use super::encoder::{Encoder, GenError};
use crate::pipeline::DayGroup;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// A day whose video could not be rendered.
#[derive(Debug)]
pub struct DayFailure {
    /// Day key of the failed group.
    pub day_key: String,
    /// Why rendering failed.
    pub error: GenError,
}

/// Outcome of rendering every group of a cycle.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Videos written, in group order.
    pub generated: Vec<PathBuf>,
    /// Days that failed, in group order.
    pub failed: Vec<DayFailure>,
}

/// Renders day groups into `<out_dir>/<day key>.<container>`.
pub struct Generator<'a> {
    encoder: &'a dyn Encoder,
    container: String,
    scratch_root: Option<PathBuf>,
}

impl<'a> Generator<'a> {
    /// Creates a generator writing videos with the given container extension.
    pub fn new(encoder: &'a dyn Encoder, container: impl Into<String>) -> Self {
        Self {
            encoder,
            container: container.into(),
            scratch_root: None,
        }
    }

    /// Creates per-cycle scratch directories under `root` instead of the
    /// system temp directory.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Path of the video for `day_key`.
    pub fn output_path(&self, out_dir: &Path, day_key: &str) -> PathBuf {
        out_dir.join(format!("{}.{}", day_key, self.container))
    }

    /// Renders a single day.
    ///
    /// Writes `<scratch_dir>/<day key>.txt` with one absolute frame path per
    /// line, then runs the encoder. The manifest is left in place.
    pub fn generate_one(
        &self,
        group: &DayGroup,
        scratch_dir: &Path,
        image_dir: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, GenError> {
        let day_key = group.day_key();
        let manifest_path = scratch_dir.join(format!("{}.txt", day_key));
        let manifest_error = |source| GenError::Manifest {
            path: manifest_path.clone(),
            source,
        };

        let mut manifest = String::new();
        for record in group.records() {
            let frame = absolute(&image_dir.join(record.filename())).map_err(manifest_error)?;
            manifest.push_str(&frame.to_string_lossy());
            manifest.push('\n');
        }
        std::fs::write(&manifest_path, manifest).map_err(manifest_error)?;

        let output = self.output_path(out_dir, &day_key);
        tracing::debug!(
            day = %day_key,
            frames = group.records().len(),
            output = %output.display(),
            "Encoding timelapse"
        );

        self.encoder.encode(&manifest_path, &output)?;
        Ok(output)
    }

    /// Renders every group concurrently.
    ///
    /// All groups share one fresh scratch directory. A failing day is logged
    /// and recorded in the report; it never stops the other days. Only a
    /// failure to create the scratch directory fails the call.
    pub fn generate_all(
        &self,
        groups: &[DayGroup],
        image_dir: &Path,
        out_dir: &Path,
    ) -> Result<GenerationReport, GenError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("timelapse");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(GenError::Scratch)?;

        let results: Vec<(String, Result<PathBuf, GenError>)> = groups
            .par_iter()
            .map(|group| {
                let result = self.generate_one(group, scratch.path(), image_dir, out_dir);
                (group.day_key(), result)
            })
            .collect();

        let mut report = GenerationReport::default();
        for (day_key, result) in results {
            match result {
                Ok(path) => {
                    tracing::info!(day = %day_key, path = %path.display(), "Created timelapse");
                    report.generated.push(path);
                }
                Err(error) => {
                    tracing::error!(day = %day_key, error = %error, "Error generating timelapse");
                    report.failed.push(DayFailure { day_key, error });
                }
            }
        }

        Ok(report)
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
