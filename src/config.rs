//! Service configuration.
//!
//! Settings come from an optional TOML file, overridden by command-line
//! flags. Every field has a default except the output directory, which must
//! be supplied by one of the two.

use crate::pipeline::{MalformedPolicy, ScanMode, BRIGHTNESS_THRESHOLD};
use crate::render::DEFAULT_FPS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Neither the file nor the flags name an output directory.
    #[error("output directory not specified")]
    MissingOutDir,
    /// Frame rate outside 1-120.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Zero-second update interval.
    #[error("update interval must be at least one second")]
    InvalidInterval,
    /// Threshold is NaN or infinite.
    #[error("brightness threshold must be a finite number")]
    InvalidThreshold,
    /// Empty container extension.
    #[error("container extension must not be empty")]
    InvalidContainer,
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[paths]`
    #[serde(default)]
    pub paths: PathsConfig,
    /// `[pipeline]`
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// `[scoring]`
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// `[encoding]`
    #[serde(default)]
    pub encoding: EncodingConfig,
    /// `[server]`
    #[serde(default)]
    pub server: HttpConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of `<seconds>-image.jpg` photos.
    pub image_dir: PathBuf,
    /// Directory receiving rendered videos. Served publicly.
    pub out_dir: Option<PathBuf>,
    /// Parent of per-cycle scratch directories (system temp dir if unset).
    pub scratch_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("./"),
            out_dir: None,
            scratch_dir: None,
        }
    }
}

/// Scanning and grouping behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Photos scoring below this are dropped.
    pub brightness_threshold: f64,
    /// Score photos concurrently.
    pub parallel: bool,
    /// Handling of `.jpg` files without a timestamp name.
    pub on_malformed: MalformedPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: BRIGHTNESS_THRESHOLD,
            parallel: true,
            on_malformed: MalformedPolicy::Fail,
        }
    }
}

/// Brightness scorer selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    /// External scorer program. The native scorer is used when unset.
    pub command: Option<PathBuf>,
}

/// Video encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Encoder program.
    pub command: PathBuf,
    /// Output frame rate.
    pub fps: u32,
    /// Output file extension.
    pub container: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("mencoder"),
            fps: DEFAULT_FPS,
            container: "avi".to_string(),
        }
    }
}

/// HTTP serving and scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Port serving the output directory.
    pub port: u16,
    /// Seconds between update cycles.
    pub update_interval_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8888,
            update_interval_secs: 60 * 60,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates values that have no sensible fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoding.fps == 0 || self.encoding.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.server.update_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if !self.pipeline.brightness_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold);
        }
        if self.encoding.container.trim().is_empty() {
            return Err(ConfigError::InvalidContainer);
        }
        Ok(())
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory of input photos.
    pub image_dir: PathBuf,
    /// Directory of rendered videos, served over HTTP.
    pub out_dir: PathBuf,
    /// Parent of scratch directories; system temp dir when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// HTTP port.
    pub port: u16,
    /// Time between update cycles.
    pub update_interval: Duration,
    /// Minimum brightness of a kept photo.
    pub brightness_threshold: f64,
    /// Parallel or sequential scoring.
    pub scan_mode: ScanMode,
    /// Handling of malformed photo names.
    pub on_malformed: MalformedPolicy,
    /// External scorer; the in-process scorer when `None`.
    pub scorer_command: Option<PathBuf>,
    /// Encoder program.
    pub encoder_command: PathBuf,
    /// Output frame rate.
    pub fps: u32,
    /// Output file extension.
    pub container: String,
}

impl Settings {
    /// Default settings for the given directories.
    pub fn new(image_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        let mut config = FileConfig::default();
        config.paths.image_dir = image_dir.into();
        Self::build(config, out_dir.into())
    }

    /// Validates a merged configuration and resolves it.
    pub fn from_config(config: FileConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let out_dir = config
            .paths
            .out_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutDir)?;
        Ok(Self::build(config, out_dir))
    }

    fn build(config: FileConfig, out_dir: PathBuf) -> Self {
        Self {
            image_dir: config.paths.image_dir,
            out_dir,
            scratch_dir: config.paths.scratch_dir,
            port: config.server.port,
            update_interval: Duration::from_secs(config.server.update_interval_secs),
            brightness_threshold: config.pipeline.brightness_threshold,
            scan_mode: if config.pipeline.parallel {
                ScanMode::Parallel
            } else {
                ScanMode::Sequential
            },
            on_malformed: config.pipeline.on_malformed,
            scorer_command: config.scoring.command,
            encoder_command: config.encoding.command,
            fps: config.encoding.fps,
            container: config.encoding.container,
        }
    }
}
