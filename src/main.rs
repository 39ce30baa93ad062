use vidctl::cli::{Args, BackendKind};
use vidctl::config::PlayerConfig;
use vidctl::core::player_events::{
    BackendEvent, FullscreenToggleRequested, PlayRequested, SeekKind, SeekRequested,
    SpeedChangeRequested,
};
use vidctl::core::registry::ActivePlayerRegistry;
use vidctl::entities::{LogSink, PlaybackSpeed, VideoMetadata, parse_streams};
use vidctl::sim::{SimTarget, build_player};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Simulated time per host loop iteration
const STEP: Duration = Duration::from_millis(50);

fn init_logging(args: &Args) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| PathBuf::from("vidctl.log"));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("vidctl starting...");
    debug!("Command-line args: {:?}", args);

    let config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };

    let streams = parse_streams(&args.streams)?;
    let preferred = args
        .preferred
        .as_deref()
        .map(PlaybackSpeed::parse)
        .transpose()
        .context("Bad --preferred speed")?;
    let video = VideoMetadata::new(&args.video_id, streams, preferred, Box::new(LogSink))?
        .with_duration(args.duration)
        .with_touch_device(args.touch);

    let target = match args.backend {
        BackendKind::Streaming => SimTarget::streaming(args.duration),
        BackendKind::Native => SimTarget::native(args.duration),
    };
    let (mut player, widgets) =
        build_player(video, &target, ActivePlayerRegistry::global(), &config)?;
    player
        .event_bus()
        .subscribe::<BackendEvent, _>(|e| debug!("Backend event: {:?}", e));

    target.fire_ready();
    player.tick();

    let bus = player.event_bus().clone();
    if args.touch {
        // Stand-in for the user's tap
        bus.emit(PlayRequested);
    }
    if let Some(time) = args.seek {
        bus.emit(SeekRequested {
            time,
            kind: SeekKind::Slide,
        });
    }
    if let Some(speed) = &args.speed {
        let speed = PlaybackSpeed::parse(speed).context("Bad --speed")?;
        bus.emit(SpeedChangeRequested {
            speed,
            explicit: true,
        });
    }
    if args.fullscreen {
        bus.emit(FullscreenToggleRequested);
    }

    // Host loop on a simulated clock
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;
    let total = Duration::from_secs_f64(args.seconds.max(0.0));
    while elapsed < total {
        elapsed += STEP;
        target.advance(STEP.as_secs_f64());
        player.tick_at(start + elapsed);
    }

    println!(
        "{}  [{}] speed {}  {}",
        widgets.last_time_label().unwrap_or_else(|| "-".to_string()),
        if player.is_playing() { "playing" } else { "stopped" },
        player.current_speed(),
        if player.is_fullscreen() { "fill browser" } else { "windowed" },
    );

    player.shutdown();
    Ok(())
}
