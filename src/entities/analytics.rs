//! Analytics events emitted by the controller.
//!
//! Names and payload keys are fixed by the tracking backend:
//!
//! | event                | payload                                  |
//! |----------------------|------------------------------------------|
//! | `load_video`         | none                                     |
//! | `play_video`         | `currentTime`                            |
//! | `pause_video`        | `currentTime`                            |
//! | `seek_video`         | `old_time`, `new_time`, `type`           |
//! | `speed_change_video` | `currentTime`, `old_speed`, `new_speed`  |
//! | `fullscreen`         | `currentTime`                            |
//! | `not_fullscreen`     | `currentTime`                            |
//!
//! Delivery is the sink's business; the controller only calls `log`.

use serde_json::{Value, json};

use super::speed::PlaybackSpeed;
use crate::core::player_events::SeekKind;

#[derive(Clone, Debug, PartialEq)]
pub enum AnalyticsEvent {
    LoadVideo,
    PlayVideo {
        current_time: f64,
    },
    PauseVideo {
        current_time: f64,
    },
    SeekVideo {
        old_time: f64,
        new_time: f64,
        kind: SeekKind,
    },
    SpeedChangeVideo {
        current_time: f64,
        old_speed: PlaybackSpeed,
        new_speed: PlaybackSpeed,
    },
    Fullscreen {
        current_time: f64,
    },
    NotFullscreen {
        current_time: f64,
    },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::LoadVideo => "load_video",
            AnalyticsEvent::PlayVideo { .. } => "play_video",
            AnalyticsEvent::PauseVideo { .. } => "pause_video",
            AnalyticsEvent::SeekVideo { .. } => "seek_video",
            AnalyticsEvent::SpeedChangeVideo { .. } => "speed_change_video",
            AnalyticsEvent::Fullscreen { .. } => "fullscreen",
            AnalyticsEvent::NotFullscreen { .. } => "not_fullscreen",
        }
    }

    /// Payload object, or `None` for events that carry none.
    pub fn payload(&self) -> Option<Value> {
        match self {
            AnalyticsEvent::LoadVideo => None,
            AnalyticsEvent::PlayVideo { current_time }
            | AnalyticsEvent::PauseVideo { current_time }
            | AnalyticsEvent::Fullscreen { current_time }
            | AnalyticsEvent::NotFullscreen { current_time } => {
                Some(json!({ "currentTime": current_time }))
            }
            AnalyticsEvent::SeekVideo {
                old_time,
                new_time,
                kind,
            } => Some(json!({
                "old_time": old_time,
                "new_time": new_time,
                "type": kind.as_str(),
            })),
            AnalyticsEvent::SpeedChangeVideo {
                current_time,
                old_speed,
                new_speed,
            } => Some(json!({
                "currentTime": current_time,
                "old_speed": old_speed.as_str(),
                "new_speed": new_speed.as_str(),
            })),
        }
    }
}

/// Receiver of analytics events (tracking backend, test recorder, ...)
pub trait AnalyticsSink {
    fn log(&self, event: &AnalyticsEvent);
}

/// Writes analytics through the `log` facade under the `analytics` target.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn log(&self, event: &AnalyticsEvent) {
        match event.payload() {
            Some(payload) => log::info!(target: "analytics", "{} {}", event.name(), payload),
            None => log::info!(target: "analytics", "{}", event.name()),
        }
    }
}
