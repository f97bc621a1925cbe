//! Daily Timelapse CLI
//!
//! Regenerates per-day timelapse videos on a fixed interval and serves the
//! output directory over HTTP.

use clap::{CommandFactory, Parser};
use daily_timelapse::{
    config::{ConfigError, FileConfig, Settings},
    cycle::{run_scheduled, UpdateCycle},
    metrics::MetricsRegistry,
    pipeline::MalformedPolicy,
    server::{ServerConfig, TimelapseServer},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "daily-timelapse", version, about)]
struct Cli {
    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of timestamped image files [default: ./]
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Directory to store completed timelapses. This directory will be
    /// served publicly, so don't put anything secret in here.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Port to serve on [default: 8888]
    #[arg(long)]
    port: Option<u16>,

    /// How often, in seconds, to regenerate all timelapses [default: 3600]
    #[arg(long)]
    update_interval: Option<u64>,

    /// External brightness scorer program (in-process scoring if unset).
    #[arg(long)]
    scorer: Option<PathBuf>,

    /// Encoder program [default: mencoder]
    #[arg(long)]
    encoder: Option<PathBuf>,

    /// Timelapse frame rate [default: 20]
    #[arg(long)]
    fps: Option<u32>,

    /// Score images one at a time.
    #[arg(long)]
    sequential: bool,

    /// Skip image files whose name has no timestamp instead of failing.
    #[arg(long)]
    skip_malformed: bool,

    /// Run a single update cycle and exit without serving.
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn apply(&self, config: &mut FileConfig) {
        if let Some(dir) = &self.image_dir {
            config.paths.image_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.paths.out_dir = Some(dir.clone());
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secs) = self.update_interval {
            config.server.update_interval_secs = secs;
        }
        if let Some(program) = &self.scorer {
            config.scoring.command = Some(program.clone());
        }
        if let Some(program) = &self.encoder {
            config.encoding.command = program.clone();
        }
        if let Some(fps) = self.fps {
            config.encoding.fps = fps;
        }
        if self.sequential {
            config.pipeline.parallel = false;
        }
        if self.skip_malformed {
            config.pipeline.on_malformed = MalformedPolicy::Skip;
        }
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();

    let mut file_config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    cli.apply(&mut file_config);

    let settings = match Settings::from_config(file_config) {
        Ok(settings) => settings,
        Err(ConfigError::MissingOutDir) => {
            eprintln!("Please specify an output directory");
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    for dir in [&settings.image_dir, &settings.out_dir] {
        if !dir.is_dir() {
            eprintln!("Not a directory: {}", dir.display());
            std::process::exit(1);
        }
    }

    info!("Daily Timelapse v{}", daily_timelapse::VERSION);

    let metrics = match MetricsRegistry::new() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    let cycle =
        Arc::new(UpdateCycle::from_settings(settings.clone()).with_metrics(Arc::clone(&metrics)));

    if cli.once {
        match cycle.run() {
            Ok(report) => {
                info!(
                    generated = report.generated.len(),
                    failed = report.failed.len(),
                    "Update cycle complete"
                );
                for failure in &report.failed {
                    warn!(day = %failure.day_key, error = %failure.error, "Day not rendered");
                }
            }
            Err(e) => {
                error!(error = %e, "Update cycle failed");
                std::process::exit(1);
            }
        }
        return;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve(cycle, metrics, &settings)) {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }

    info!("Done");
}

async fn serve(
    cycle: Arc<UpdateCycle>,
    metrics: Arc<MetricsRegistry>,
    settings: &Settings,
) -> Result<(), daily_timelapse::server::ServerError> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
        }
        let _ = shutdown_tx.send(true);
    });

    let schedule = tokio::spawn(run_scheduled(cycle, stopped(shutdown_rx.clone())));

    let server = TimelapseServer::new(
        ServerConfig::with_port(&settings.out_dir, settings.port)
            .with_container(settings.container.clone()),
        metrics,
    );
    server.run(stopped(shutdown_rx)).await?;

    if let Err(e) = schedule.await {
        warn!(error = %e, "Update schedule ended abnormally");
    }
    Ok(())
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> FileConfig {
        FileConfig::parse(
            r#"
            [paths]
            image_dir = "/var/captures"
            out_dir = "/srv/timelapse"

            [encoding]
            fps = 30

            [server]
            port = 9000
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_log_filter_honours_rust_log() {
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
        assert_eq!(
            log_filter(Some("daily_timelapse=trace")).to_string(),
            "daily_timelapse=trace"
        );
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("daily_timelapse=loud")).to_string(), "info");
    }

    #[test]
    fn test_flags_override_config_file() {
        let cli = Cli::try_parse_from([
            "daily-timelapse",
            "--out-dir",
            "/tmp/out",
            "--port",
            "8080",
            "--update-interval",
            "60",
            "--sequential",
            "--skip-malformed",
        ])
        .unwrap();

        let mut config = file_config();
        cli.apply(&mut config);
        let settings = Settings::from_config(config).unwrap();

        assert_eq!(settings.out_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.update_interval.as_secs(), 60);
        assert_eq!(settings.on_malformed, MalformedPolicy::Skip);
        assert!(!cli.once);
        // Values without a flag come from the file.
        assert_eq!(settings.image_dir, PathBuf::from("/var/captures"));
        assert_eq!(settings.fps, 30);
    }

    #[test]
    fn test_no_flags_keeps_config_file() {
        let cli = Cli::try_parse_from(["daily-timelapse"]).unwrap();

        let mut config = file_config();
        cli.apply(&mut config);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.paths.out_dir, Some(PathBuf::from("/srv/timelapse")));
        assert!(config.pipeline.parallel);
        assert_eq!(config.pipeline.on_malformed, MalformedPolicy::Fail);
    }

    #[test]
    fn test_out_dir_required_from_somewhere() {
        let cli = Cli::try_parse_from(["daily-timelapse", "--image-dir", "."]).unwrap();

        let mut config = FileConfig::default();
        cli.apply(&mut config);

        assert!(matches!(
            Settings::from_config(config),
            Err(ConfigError::MissingOutDir)
        ));
    }

    #[test]
    fn test_invalid_fps_flag_rejected() {
        let cli = Cli::try_parse_from(["daily-timelapse", "--out-dir", "out", "--fps", "0"]).unwrap();

        let mut config = FileConfig::default();
        cli.apply(&mut config);

        assert!(matches!(
            Settings::from_config(config),
            Err(ConfigError::InvalidFrameRate)
        ));
    }
}
