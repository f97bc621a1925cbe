//! Scorer abstraction and the external-program adapter.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Errors that can occur while scoring a photo.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The scorer program could not be started.
    #[error("failed to launch scorer {}: {source}", .program.display())]
    Launch {
        /// Program that was invoked.
        program: PathBuf,
        /// Spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// The scorer exited unsuccessfully.
    #[error("scorer exited with {status} for {}: {stderr}", .path.display())]
    Failed {
        /// Photo being scored.
        path: PathBuf,
        /// Exit status of the scorer.
        status: ExitStatus,
        /// Trimmed stderr of the scorer.
        stderr: String,
    },

    /// The scorer's stdout was not a number.
    #[error("scorer printed unparsable output {output:?} for {}", .path.display())]
    Unparsable {
        /// Photo being scored.
        path: PathBuf,
        /// Trimmed stdout of the scorer.
        output: String,
    },

    /// The photo could not be decoded in-process.
    #[error("failed to decode image {}: {message}", .path.display())]
    Decode {
        /// Photo being scored.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
}

/// Trait for brightness scorer implementations.
///
/// Implementations are shared across the scanning pool, so they must be
/// `Send + Sync` and must not rely on call order.
pub trait BrightnessScorer: Send + Sync {
    /// Scores one photo.
    fn score(&self, path: &Path) -> Result<f64, ScoreError>;
}

/// Runs an external program once per photo.
///
/// The program receives the photo path as its only argument and must print
/// a single floating-point number to stdout and exit zero.
#[derive(Debug, Clone)]
pub struct CommandScorer {
    program: PathBuf,
}

impl CommandScorer {
    /// Creates a scorer that invokes `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the program this scorer invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl BrightnessScorer for CommandScorer {
    fn score(&self, path: &Path) -> Result<f64, ScoreError> {
        let output = Command::new(&self.program)
            .arg(path)
            .output()
            .map_err(|source| ScoreError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ScoreError::Failed {
                path: path.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_score(path, &output.stdout)
    }
}

fn parse_score(path: &Path, stdout: &[u8]) -> Result<f64, ScoreError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();

    trimmed.parse::<f64>().map_err(|_| ScoreError::Unparsable {
        path: path.to_path_buf(),
        output: trimmed.to_string(),
    })
}
