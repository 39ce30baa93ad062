//! Video metadata: the per-embed facts the controller consults but does not own.
//!
//! Holds the speed -> media id table, the current speed, the duration known
//! from metadata (available before any backend is ready), the device class
//! and the analytics sink.

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::{debug, warn};

use super::analytics::{AnalyticsEvent, AnalyticsSink};
use super::speed::PlaybackSpeed;

/// Speed -> media id, in the order the speeds were listed.
pub type SpeedStreams = IndexMap<PlaybackSpeed, String>;

/// Parse a `speed:id,speed:id` stream list.
///
/// Empty entries are skipped; the list must name at least one stream.
pub fn parse_streams(raw: &str) -> Result<SpeedStreams> {
    let mut streams = SpeedStreams::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((speed, id)) = entry.split_once(':') else {
            bail!("Stream entry '{}' is not in speed:id form", entry);
        };
        let speed = PlaybackSpeed::parse(speed)
            .with_context(|| format!("Bad speed in stream entry '{}'", entry))?;
        let id = id.trim();
        if id.is_empty() {
            bail!("Stream entry '{}' has an empty media id", entry);
        }
        if streams.contains_key(&speed) {
            bail!("Stream entry '{}' repeats speed {}", entry, speed);
        }
        streams.insert(speed, id.to_string());
    }
    if streams.is_empty() {
        bail!("Stream list '{}' names no streams", raw);
    }
    Ok(streams)
}

pub struct VideoMetadata {
    id: String,
    streams: SpeedStreams,
    speed: PlaybackSpeed,
    preferred_speed: Option<PlaybackSpeed>,
    duration: f64,
    touch_device: bool,
    sink: Box<dyn AnalyticsSink>,
}

impl VideoMetadata {
    /// Create metadata for one embed.
    ///
    /// Initial speed: `preferred` if it is one of the streams, else "1.0"
    /// if listed, else the first listed speed.
    pub fn new(
        id: impl Into<String>,
        streams: SpeedStreams,
        preferred: Option<PlaybackSpeed>,
        sink: Box<dyn AnalyticsSink>,
    ) -> Result<Self> {
        let id = id.into();
        let normal = PlaybackSpeed::normal();
        let speed = preferred
            .as_ref()
            .filter(|s| streams.contains_key(*s))
            .cloned()
            .or_else(|| streams.contains_key(&normal).then_some(normal))
            .or_else(|| streams.keys().next().cloned())
            .with_context(|| format!("Video '{}' has no streams", id))?;
        debug!("Video {}: {} speeds, starting at {}", id, streams.len(), speed);

        Ok(Self {
            id,
            streams,
            speed,
            preferred_speed: preferred,
            duration: 0.0,
            touch_device: false,
            sink,
        })
    }

    /// Set duration known from metadata
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Record the device class (read once, at construction)
    pub fn with_touch_device(mut self, touch: bool) -> Self {
        self.touch_device = touch;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Available speeds in listed order
    pub fn speeds(&self) -> Vec<PlaybackSpeed> {
        self.streams.keys().cloned().collect()
    }

    pub fn current_speed(&self) -> &PlaybackSpeed {
        &self.speed
    }

    /// Media id of the current speed's asset
    pub fn media_id(&self) -> &str {
        // `speed` is always a key of `streams` (checked in new/set_speed)
        self.streams.get(&self.speed).map(String::as_str).unwrap_or_default()
    }

    pub fn media_id_for(&self, speed: &PlaybackSpeed) -> Option<&str> {
        self.streams.get(speed).map(String::as_str)
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
    }

    /// Switch the current speed. `explicit` marks a user choice worth
    /// remembering as the preferred speed.
    ///
    /// Returns false (and changes nothing) for a speed with no stream.
    pub fn set_speed(&mut self, speed: &PlaybackSpeed, explicit: bool) -> bool {
        if !self.streams.contains_key(speed) {
            warn!("Video {}: no stream for speed {}", self.id, speed);
            return false;
        }
        self.speed = speed.clone();
        if explicit {
            debug!("Video {}: preferred speed now {}", self.id, speed);
            self.preferred_speed = Some(speed.clone());
        }
        true
    }

    pub fn preferred_speed(&self) -> Option<&PlaybackSpeed> {
        self.preferred_speed.as_ref()
    }

    pub fn is_touch_device(&self) -> bool {
        self.touch_device
    }

    /// Hand an analytics event to the sink
    pub fn log(&self, event: &AnalyticsEvent) {
        self.sink.log(event);
    }
}

impl std::fmt::Debug for VideoMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoMetadata")
            .field("id", &self.id)
            .field("streams", &self.streams)
            .field("speed", &self.speed)
            .field("duration", &self.duration)
            .field("touch_device", &self.touch_device)
            .finish()
    }
}
