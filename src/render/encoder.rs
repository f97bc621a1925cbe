//! Encoder abstraction and the `mencoder` adapter.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Frame rate used when none is configured.
pub const DEFAULT_FPS: u32 = 20;

/// Errors that can occur while rendering a day.
#[derive(Debug, Error)]
pub enum GenError {
    /// The per-cycle scratch directory could not be created.
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// A day's frame manifest could not be written.
    #[error("failed to write manifest {}: {source}", .path.display())]
    Manifest {
        /// Manifest being written.
        path: PathBuf,
        /// Write failure.
        #[source]
        source: std::io::Error,
    },

    /// The encoder program could not be started.
    #[error("failed to launch encoder {}: {source}", .program.display())]
    Launch {
        /// Program that was invoked.
        program: PathBuf,
        /// Spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// The encoder exited unsuccessfully.
    #[error("encoder failed to produce {}: {diagnostics}", .output.display())]
    Failed {
        /// Video that was being written.
        output: PathBuf,
        /// Exit code, if the encoder was not killed by a signal.
        code: Option<i32>,
        /// Encoder stderr, or stdout when stderr was empty.
        diagnostics: String,
    },
}

/// Trait for video encoder implementations.
///
/// `manifest` is a newline-delimited list of absolute frame paths in
/// playback order. Implementations write the video to `output`.
pub trait Encoder: Send + Sync {
    /// Renders the frames listed in `manifest` into `output`.
    fn encode(&self, manifest: &Path, output: &Path) -> Result<(), GenError>;
}

/// Renders with `mencoder` reading JPEG frames from a manifest.
#[derive(Debug, Clone)]
pub struct MencoderEncoder {
    program: PathBuf,
    fps: u32,
}

impl Default for MencoderEncoder {
    fn default() -> Self {
        Self::new("mencoder", DEFAULT_FPS)
    }
}

impl MencoderEncoder {
    /// Creates an encoder invoking `program` at `fps` frames per second.
    pub fn new(program: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            program: program.into(),
            fps,
        }
    }

    /// Output frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Command-line arguments for one invocation.
    pub fn args(&self, manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut source = OsString::from("mf://@");
        source.push(manifest);

        vec![
            "-nosound".into(),
            "-ovc".into(),
            "lavc".into(),
            "-mf".into(),
            format!("type=jpeg:fps={}", self.fps).into(),
            source,
            "-o".into(),
            output.as_os_str().to_os_string(),
        ]
    }
}

impl Encoder for MencoderEncoder {
    fn encode(&self, manifest: &Path, output: &Path) -> Result<(), GenError> {
        let result = Command::new(&self.program)
            .args(self.args(manifest, output))
            .output()
            .map_err(|source| GenError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            // mencoder reports most problems on stdout.
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let diagnostics = if stderr.is_empty() {
                String::from_utf8_lossy(&result.stdout).trim().to_string()
            } else {
                stderr
            };

            return Err(GenError::Failed {
                output: output.to_path_buf(),
                code: result.status.code(),
                diagnostics,
            });
        }

        Ok(())
    }
}
