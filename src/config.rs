use clap::{ArgAction, Parser};
use std::{net::SocketAddr, path::PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "snapcook",
    version,
    about = "HTTP API that turns ingredient photos into recipes"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
}

/// Snapcook server configuration
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (-q, -qq, -qqq)
    #[arg(short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Address to bind the HTTP server to
    #[arg(long, env = "SNAPCOOK_BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Database connection string (e.g. `sqlite://snapcook.sqlite`)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://snapcook.sqlite")]
    pub database_url: String,

    /// Log file path (logs are written to stdout + this file)
    #[arg(long, env = "SNAPCOOK_LOG_FILE", default_value = "snapcook.logs")]
    pub log_file: PathBuf,

    /// CORS allowed origin. If not set, allows all origins
    #[arg(long, env = "SNAPCOOK_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Google AI Studio API key; recipe generation is unavailable without it
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Gemini model used for recipe generation
    #[arg(long, env = "SNAPCOOK_MODEL", default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Gemini API base URL
    #[arg(
        long,
        env = "SNAPCOOK_GEMINI_API_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_api_url: String,

    /// Timeout for a single model call, in seconds
    #[arg(long, env = "SNAPCOOK_MODEL_TIMEOUT_SECS", default_value_t = 120)]
    pub model_timeout_secs: u64,

    /// Maximum accepted request body size for uploads, in bytes
    #[arg(long, env = "SNAPCOOK_MAX_UPLOAD_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Config {
    #[must_use]
    pub fn verbosity_delta(&self) -> i16 {
        i16::from(self.verbose) - i16::from(self.quiet)
    }

    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_delta() {
            d if d <= -2 => "error",
            -1 => "warn",
            0 => "info,snapcook=info,axum=info,tower_http=info,sqlx=warn",
            1 => "debug,snapcook=debug,axum=info,tower_http=info,sqlx=warn,hyper=info",
            2 => "trace,snapcook=trace,axum=debug,tower_http=trace,sqlx=info,hyper=info",
            _ => "trace,snapcook=trace,axum=trace,tower_http=trace,sqlx=debug,hyper=debug",
        }
    }

    /// The API key, if one was given and is not blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.google_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
