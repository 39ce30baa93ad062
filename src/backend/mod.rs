//! Playback backends - one command contract over two embed technologies.
//!
//! - `StreamingBackend`: a streaming-platform embed addressed by video id
//! - `NativeMediaBackend`: a native media element fed from a source list
//!
//! Both translate their own callback vocabulary into `BackendEvent`s on the
//! controller's bus and expose the same commands through `PlaybackBackend`.
//! The controller only ever sees the `Backend` enum.
//!
//! Commands issued before the backend reported ready are dropped silently:
//! a user can click play before the embed finished loading.

pub mod native;
pub mod streaming;

use anyhow::{Context, Result};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::core::event_bus::EventEmitter;
use crate::entities::{FixedTime, VideoMetadata};

pub use native::{
    MediaElement, MediaElementCallbacks, MediaEvent, MediaSource, NativeMediaBackend,
    NativeSources,
};
pub use streaming::{StreamingBackend, StreamingCallbacks, StreamingEmbed};

/// Normalised playback state. Exactly one holds at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Ended,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Unstarted => "unstarted",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
        }
    }
}

/// Command/query contract every backend fulfils.
#[enum_dispatch]
pub trait PlaybackBackend {
    /// Short name for logs ("streaming", "native")
    fn kind(&self) -> &'static str;

    /// True once the ready callback has fired
    fn is_ready(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    fn seek_to(&mut self, time: f64, allow_seek_ahead: bool);

    /// Volume 0..=100
    fn set_volume(&mut self, level: u8);

    fn volume(&self) -> u8;

    /// Switch asset and resume playing at `start`
    fn load_by_id(&mut self, media_id: &str, start: &FixedTime);

    /// Switch asset and hold at `start` without playing
    fn cue_by_id(&mut self, media_id: &str, start: &FixedTime);

    /// Playhead position; `None` while the backend has no position yet
    /// (not ready, or between assets). Never a stand-in zero.
    fn current_time(&self) -> Option<f64>;

    fn duration(&self) -> f64;

    /// Last reported state; `None` for transitional states the controller
    /// does not track (buffering, cued).
    fn player_state(&self) -> Option<PlaybackState>;

    /// Request a playback quality. Backends without quality levels ignore it.
    fn set_playback_quality(&mut self, _quality: &str) {}

    fn available_quality_levels(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The backend a controller owns. Variant chosen once, at embed time.
#[enum_dispatch(PlaybackBackend)]
pub enum Backend {
    StreamingBackend,
    NativeMediaBackend,
}

/// Concrete technology handed over by the host page.
pub enum EmbedTarget {
    Streaming(Box<dyn StreamingEmbed>),
    Native {
        element: Box<dyn MediaElement>,
        sources: NativeSources,
    },
}

/// Build and attach the backend for `video`.
///
/// Fails when a native target has no playable source for one of the
/// video's speeds; that is a configuration problem and must surface before
/// a controller is created.
pub fn embed(
    target: EmbedTarget,
    video: &VideoMetadata,
    config: &PlayerConfig,
    emitter: EventEmitter,
) -> Result<Backend> {
    let backend: Backend = match target {
        EmbedTarget::Streaming(embed) => {
            StreamingBackend::new(embed, video.media_id(), &config.player_vars, emitter).into()
        }
        EmbedTarget::Native { element, sources } => {
            let speeds = video.speeds();
            let media_ids = speeds.iter().filter_map(|s| video.media_id_for(s));
            native::require_playable(element.as_ref(), &sources, media_ids)
                .with_context(|| format!("Video {} cannot be embedded", video.id()))?;
            NativeMediaBackend::new(element, sources, video.media_id(), emitter)?.into()
        }
    };
    log::info!("Video {}: embedded {} backend", video.id(), backend.kind());
    Ok(backend)
}
