//! Events delivered to a controller through its event bus.
//!
//! Widgets and backends never call the controller directly: they emit one of
//! these on the `EventEmitter` they were built with, and the controller picks
//! them up in `VideoPlayer::process_events()`.

use crate::backend::PlaybackState;
use crate::entities::PlaybackSpeed;

// === Transport ===

/// Play button clicked
#[derive(Clone, Debug)]
pub struct PlayRequested;

/// Pause button clicked, or another player took over the active slot
#[derive(Clone, Debug)]
pub struct PauseRequested;

// === Seek ===

/// Which widget asked for a seek. Recorded as the `type` of `seek_video`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekKind {
    /// Progress slider drag/click
    Slide,
    /// Click on a caption line
    Caption,
}

impl SeekKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeekKind::Slide => "slide_seek",
            SeekKind::Caption => "caption_seek",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SeekRequested {
    pub time: f64,
    pub kind: SeekKind,
}

// === Speed / volume / quality ===

/// Speed menu selection. `explicit` marks a user choice to be remembered.
#[derive(Clone, Debug)]
pub struct SpeedChangeRequested {
    pub speed: PlaybackSpeed,
    pub explicit: bool,
}

/// Volume slider moved (0..=100)
#[derive(Clone, Debug)]
pub struct VolumeChangeRequested(pub u8);

/// HD button clicked
#[derive(Clone, Debug)]
pub struct QualityToggleRequested;

// === Presentation ===

/// Fill-browser button clicked
#[derive(Clone, Debug)]
pub struct FullscreenToggleRequested;

/// Escape released anywhere in the document
#[derive(Clone, Debug)]
pub struct EscapeReleased;

// === Backend lifecycle ===

/// Normalised backend callback
#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    /// Backend can take commands. Sent at most once, before any state change.
    Ready,
    StateChanged(PlaybackState),
    QualityChanged(String),
}
