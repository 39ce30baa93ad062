//! Core controller modules - events, registry, poll timer, player
//!
//! These modules coordinate playback, independent of any widget toolkit.

pub mod dispatch;
pub mod event_bus;
pub mod player;
pub mod player_events;
pub mod registry;
pub mod updater;

// Re-exports for convenience
pub use event_bus::{EventBus, EventEmitter};
pub use player::VideoPlayer;
pub use registry::{ActivePlayerRegistry, PlayerHandle};
pub use updater::{IntervalHandle, Updater};
