//! VIDCTL - Video playback controller library
//!
//! Re-exports all modules for use by binary targets.

// Controller core (events, registry, poll timer, player)
pub mod core;

// Playback technologies
pub mod backend;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod sim;
pub mod widgets;

// Re-export commonly used types from core
pub use crate::core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use crate::core::player::VideoPlayer;
pub use crate::core::registry::ActivePlayerRegistry;

pub use backend::{Backend, EmbedTarget, PlaybackBackend, PlaybackState};
pub use config::PlayerConfig;
pub use entities::{AnalyticsEvent, AnalyticsSink, PlaybackSpeed, VideoMetadata};
