/// Command-line configuration and log setup
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::ValueHint;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::ViewerConfig;

/// Model opened when no path is given.
pub const DEFAULT_MODEL_PATH: &str = "../models/optimized_phone_stand.obj";

#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Interactive terminal viewer that scales and rotates an OBJ mesh")]
pub struct Cli {
    /// OBJ file to load
    #[arg(default_value = DEFAULT_MODEL_PATH, value_hint = ValueHint::FilePath)]
    pub model: PathBuf,
    /// Logging output filters; comma-separated
    #[arg(short, long, default_value = "info", env = "MESHCTL_LOG")]
    pub log_filter: String,
    /// Write logs to this file instead of stderr
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
    /// Frame-rate cap while animating
    #[arg(long, default_value_t = 30.0)]
    pub max_fps: f64,
}

impl Cli {
    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            max_fps: self.max_fps,
            ..ViewerConfig::default()
        }
    }
}

/// Install the global `tracing` subscriber.
pub fn initialize_tracing(log_filter: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(log_filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["meshctl"]).unwrap();
        assert_eq!(cli.model, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(cli.log_file.is_none());

        let config = cli.viewer_config();
        assert_eq!(config.max_fps, 30.0);
        assert_eq!(config.window_size, (1600, 1400));
    }

    #[test]
    fn test_model_and_fps() {
        let cli = Cli::try_parse_from(["meshctl", "bunny.obj", "--max-fps", "60"]).unwrap();
        assert_eq!(cli.model, PathBuf::from("bunny.obj"));
        assert_eq!(cli.viewer_config().max_fps, 60.0);
    }

    #[test]
    fn test_bad_filter_rejected() {
        assert!(matches!(
            initialize_tracing("meshctl=[", None),
            Err(AppError::LogFilter(_))
        ));
    }
}
