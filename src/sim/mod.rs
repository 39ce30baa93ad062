//! Simulated host: backends, widgets and analytics without a page.
//!
//! Used by the unit tests and the `vidctl` demo binary. Every simulated part
//! records what the controller asked of it and lets the caller fire the
//! callbacks a real embed would.

pub mod element;
pub mod embed;
pub mod widgets;

use anyhow::Result;

pub use element::{ElementCall, SimulatedElement};
pub use embed::{EmbedCall, SimulatedEmbed};
pub use widgets::{RecordingSink, RecordingWidget, WidgetCall, WidgetLog, recording_widgets};

use crate::backend::{self, EmbedTarget, MediaEvent, MediaSource, NativeSources};
use crate::config::PlayerConfig;
use crate::core::event_bus::EventBus;
use crate::core::player::VideoPlayer;
use crate::core::registry::ActivePlayerRegistry;
use crate::entities::VideoMetadata;

/// Simulated playback technology, kept by the caller to drive it.
#[derive(Clone, Debug)]
pub enum SimTarget {
    Streaming(SimulatedEmbed),
    Native(SimulatedElement),
}

impl SimTarget {
    pub fn streaming(duration: f64) -> Self {
        SimTarget::Streaming(SimulatedEmbed::new(duration))
    }

    /// Element that plays mp4 only
    pub fn native(duration: f64) -> Self {
        SimTarget::Native(SimulatedElement::new(&["video/mp4"], duration))
    }

    pub fn fire_ready(&self) {
        match self {
            SimTarget::Streaming(embed) => embed.fire_ready(),
            SimTarget::Native(element) => element.fire(MediaEvent::CanPlay),
        }
    }

    pub fn set_position(&self, position: Option<f64>) {
        match self {
            SimTarget::Streaming(embed) => embed.set_position(position),
            SimTarget::Native(element) => element.set_position(position),
        }
    }

    pub fn advance(&self, secs: f64) {
        match self {
            SimTarget::Streaming(embed) => embed.advance(secs),
            SimTarget::Native(element) => element.advance(secs),
        }
    }

    /// Embed target for `video`. Native targets get one mp4 source per
    /// speed, named after the media id.
    fn embed_target(&self, video: &VideoMetadata) -> EmbedTarget {
        match self {
            SimTarget::Streaming(embed) => EmbedTarget::Streaming(Box::new(embed.clone())),
            SimTarget::Native(element) => {
                let sources: NativeSources = video
                    .speeds()
                    .iter()
                    .filter_map(|s| video.media_id_for(s))
                    .map(|id| {
                        let source = MediaSource::new(format!("/media/{}.mp4", id), "video/mp4");
                        (id.to_string(), vec![source])
                    })
                    .collect();
                EmbedTarget::Native {
                    element: Box::new(element.clone()),
                    sources,
                }
            }
        }
    }
}

/// Wire a controller over `target` with recording widgets.
pub fn build_player(
    video: VideoMetadata,
    target: &SimTarget,
    registry: ActivePlayerRegistry,
    config: &PlayerConfig,
) -> Result<(VideoPlayer, WidgetLog)> {
    let bus = EventBus::new();
    let backend = backend::embed(target.embed_target(&video), &video, config, bus.emitter())?;
    let (widgets, log) = recording_widgets();
    let player = VideoPlayer::new(video, bus, backend, widgets, registry, config);
    Ok((player, log))
}
