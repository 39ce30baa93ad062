use clap::{Parser, ValueEnum};
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Poll:   ", crate::core::updater::DEFAULT_UPDATE_INTERVAL_MS, "ms\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Playback technology to simulate
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Streaming-platform embed addressed by video id
    Streaming,
    /// Native media element with per-speed sources
    Native,
}

/// Headless video playback controller demo
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Video id (used in logs and analytics)
    #[arg(value_name = "VIDEO_ID", default_value = "demo")]
    pub video_id: String,

    /// Speed streams as speed:id pairs
    #[arg(
        short = 's',
        long = "streams",
        value_name = "LIST",
        default_value = "0.75:slowerSpeedId,1.0:normalSpeedId,1.25:fasterSpeedId,1.50:fastestSpeedId"
    )]
    pub streams: String,

    /// Backend to simulate
    #[arg(short = 'b', long = "backend", value_enum, default_value = "streaming")]
    pub backend: BackendKind,

    /// Video duration in seconds
    #[arg(short = 'd', long = "duration", value_name = "SECS", default_value_t = 1800.0)]
    pub duration: f64,

    /// Behave as a touch device (no autoplay, no volume control)
    #[arg(short = 't', long = "touch")]
    pub touch: bool,

    /// Seek to this position once ready
    #[arg(long = "seek", value_name = "SECS")]
    pub seek: Option<f64>,

    /// Switch to this speed once ready
    #[arg(long = "speed", value_name = "SPEED")]
    pub speed: Option<String>,

    /// Stored speed preference used to pick the initial speed
    #[arg(long = "preferred", value_name = "SPEED")]
    pub preferred: Option<String>,

    /// Toggle fill-browser mode once ready
    #[arg(short = 'F', long = "fullscreen")]
    pub fullscreen: bool,

    /// Simulated playback time
    #[arg(short = 'n', long = "seconds", value_name = "SECS", default_value_t = 5.0)]
    pub seconds: f64,

    /// Enable debug logging to file (default: vidctl.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Player configuration file (JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}
