//! Streaming-platform embed backend.
//!
//! The embed is addressed by video id and reports its lifecycle through
//! three callbacks (ready, numeric state change, quality change). Each
//! speed is a separate video id, so a speed switch is a load/cue by id.

use log::{debug, trace};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{PlaybackBackend, PlaybackState};
use crate::config::PlayerVars;
use crate::core::event_bus::EventEmitter;
use crate::core::player_events::BackendEvent;
use crate::entities::FixedTime;

// Embed state codes
pub const STATE_UNSTARTED: i32 = -1;
pub const STATE_ENDED: i32 = 0;
pub const STATE_PLAYING: i32 = 1;
pub const STATE_PAUSED: i32 = 2;
pub const STATE_BUFFERING: i32 = 3;
pub const STATE_CUED: i32 = 5;

/// Map an embed state code. Buffering, cued and unknown codes map to `None`.
pub fn state_from_code(code: i32) -> Option<PlaybackState> {
    match code {
        STATE_UNSTARTED => Some(PlaybackState::Unstarted),
        STATE_ENDED => Some(PlaybackState::Ended),
        STATE_PLAYING => Some(PlaybackState::Playing),
        STATE_PAUSED => Some(PlaybackState::Paused),
        _ => None,
    }
}

/// Raw streaming embed API, implemented by the host's bridge to the
/// platform player (or by `sim::SimulatedEmbed`).
pub trait StreamingEmbed {
    /// Create the player for `video_id` and register lifecycle callbacks.
    fn attach(&mut self, video_id: &str, player_vars: &PlayerVars, callbacks: StreamingCallbacks);
    fn play_video(&mut self);
    fn pause_video(&mut self);
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);
    fn set_volume(&mut self, level: u8);
    fn volume(&self) -> u8;
    fn load_video_by_id(&mut self, video_id: &str, start: &FixedTime);
    fn cue_video_by_id(&mut self, video_id: &str, start: &FixedTime);
    fn current_time(&self) -> Option<f64>;
    fn duration(&self) -> f64;
    fn player_state(&self) -> i32;
    fn set_playback_quality(&mut self, quality: &str);
    fn available_quality_levels(&self) -> Vec<String>;
}

/// Lifecycle callbacks handed to the embed. Translates the embed's
/// vocabulary into `BackendEvent`s on the controller's bus.
#[derive(Clone, Debug)]
pub struct StreamingCallbacks {
    emitter: EventEmitter,
    ready: Arc<AtomicBool>,
}

impl StreamingCallbacks {
    /// Repeated ready callbacks are swallowed.
    pub fn on_ready(&self) {
        if self.ready.swap(true, Ordering::SeqCst) {
            trace!("Streaming embed: duplicate ready ignored");
            return;
        }
        self.emitter.emit(BackendEvent::Ready);
    }

    pub fn on_state_change(&self, code: i32) {
        match state_from_code(code) {
            Some(state) => self.emitter.emit(BackendEvent::StateChanged(state)),
            None => trace!("Streaming embed: state {} not tracked", code),
        }
    }

    pub fn on_playback_quality_change(&self, quality: &str) {
        self.emitter.emit(BackendEvent::QualityChanged(quality.to_string()));
    }
}

pub struct StreamingBackend {
    embed: Box<dyn StreamingEmbed>,
    ready: Arc<AtomicBool>,
}

impl StreamingBackend {
    /// Attach `embed` to `video_id`; lifecycle events go to `emitter`.
    pub fn new(
        mut embed: Box<dyn StreamingEmbed>,
        video_id: &str,
        player_vars: &PlayerVars,
        emitter: EventEmitter,
    ) -> Self {
        let ready = Arc::new(AtomicBool::new(false));
        let callbacks = StreamingCallbacks {
            emitter,
            ready: Arc::clone(&ready),
        };
        debug!("Streaming backend: attaching to {}", video_id);
        embed.attach(video_id, player_vars, callbacks);
        Self { embed, ready }
    }

    fn ready_for(&self, command: &str) -> bool {
        let ready = self.is_ready();
        if !ready {
            trace!("Streaming backend: {} before ready, ignored", command);
        }
        ready
    }
}

impl PlaybackBackend for StreamingBackend {
    fn kind(&self) -> &'static str {
        "streaming"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn play(&mut self) {
        if self.ready_for("play") {
            self.embed.play_video();
        }
    }

    fn pause(&mut self) {
        if self.ready_for("pause") {
            self.embed.pause_video();
        }
    }

    fn seek_to(&mut self, time: f64, allow_seek_ahead: bool) {
        if self.ready_for("seek") {
            self.embed.seek_to(time, allow_seek_ahead);
        }
    }

    fn set_volume(&mut self, level: u8) {
        if self.ready_for("set_volume") {
            self.embed.set_volume(level.min(100));
        }
    }

    fn volume(&self) -> u8 {
        if self.is_ready() { self.embed.volume() } else { 0 }
    }

    fn load_by_id(&mut self, media_id: &str, start: &FixedTime) {
        if self.ready_for("load") {
            debug!("Streaming backend: load {} at {}", media_id, start);
            self.embed.load_video_by_id(media_id, start);
        }
    }

    fn cue_by_id(&mut self, media_id: &str, start: &FixedTime) {
        if self.ready_for("cue") {
            debug!("Streaming backend: cue {} at {}", media_id, start);
            self.embed.cue_video_by_id(media_id, start);
        }
    }

    fn current_time(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        self.embed.current_time().filter(|t| t.is_finite() && *t >= 0.0)
    }

    fn duration(&self) -> f64 {
        if self.is_ready() { self.embed.duration() } else { 0.0 }
    }

    fn player_state(&self) -> Option<PlaybackState> {
        if !self.is_ready() {
            return Some(PlaybackState::Unstarted);
        }
        state_from_code(self.embed.player_state())
    }

    fn set_playback_quality(&mut self, quality: &str) {
        if self.ready_for("set_playback_quality") {
            self.embed.set_playback_quality(quality);
        }
    }

    fn available_quality_levels(&self) -> Vec<String> {
        if self.is_ready() {
            self.embed.available_quality_levels()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{EventBus, downcast_event};
    use crate::sim::{EmbedCall, SimulatedEmbed};

    fn backend() -> (EventBus, SimulatedEmbed, StreamingBackend) {
        let bus = EventBus::new();
        let sim = SimulatedEmbed::new(1800.0);
        let backend = StreamingBackend::new(
            Box::new(sim.clone()),
            "normalSpeedId",
            &PlayerVars::default(),
            bus.emitter(),
        );
        (bus, sim, backend)
    }

    fn backend_events(bus: &EventBus) -> Vec<BackendEvent> {
        bus.poll()
            .iter()
            .filter_map(|e| downcast_event::<BackendEvent>(e).cloned())
            .collect()
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(state_from_code(-1), Some(PlaybackState::Unstarted));
        assert_eq!(state_from_code(0), Some(PlaybackState::Ended));
        assert_eq!(state_from_code(1), Some(PlaybackState::Playing));
        assert_eq!(state_from_code(2), Some(PlaybackState::Paused));
        assert_eq!(state_from_code(STATE_BUFFERING), None);
        assert_eq!(state_from_code(STATE_CUED), None);
        assert_eq!(state_from_code(42), None);
    }

    #[test]
    fn test_attach_passes_video_and_vars() {
        let (_, sim, _) = backend();
        assert_eq!(sim.attached_video().as_deref(), Some("normalSpeedId"));
        assert_eq!(sim.attached_vars(), Some(PlayerVars::default()));
    }

    #[test]
    fn test_commands_before_ready_are_dropped() {
        let (_, sim, mut backend) = backend();
        backend.play();
        backend.pause();
        backend.seek_to(10.0, true);
        assert!(sim.calls().is_empty());
        assert_eq!(backend.current_time(), None);
        assert_eq!(backend.player_state(), Some(PlaybackState::Unstarted));
    }

    #[test]
    fn test_ready_fires_once() {
        let (bus, sim, backend) = backend();
        sim.fire_ready();
        sim.fire_ready();
        assert!(backend.is_ready());
        assert_eq!(backend_events(&bus), vec![BackendEvent::Ready]);
    }

    #[test]
    fn test_state_change_translation() {
        let (bus, sim, mut backend) = backend();
        sim.fire_ready();
        backend.play();
        assert_eq!(sim.calls(), vec![EmbedCall::Play]);
        assert_eq!(
            backend_events(&bus),
            vec![
                BackendEvent::Ready,
                BackendEvent::StateChanged(PlaybackState::Playing)
            ]
        );
        assert_eq!(backend.player_state(), Some(PlaybackState::Playing));

        // Buffering is not forwarded
        sim.fire_state(STATE_BUFFERING);
        assert!(backend_events(&bus).is_empty());
    }

    #[test]
    fn test_load_and_cue_keep_fixed_time() {
        let (_, sim, mut backend) = backend();
        sim.fire_ready();
        let start = FixedTime::from_secs(80.0);
        backend.load_by_id("slowerSpeedId", &start);
        backend.cue_by_id("slowerSpeedId", &start);
        assert_eq!(
            sim.calls(),
            vec![
                EmbedCall::Load("slowerSpeedId".into(), "80.000".into()),
                EmbedCall::Cue("slowerSpeedId".into(), "80.000".into()),
            ]
        );
    }

    #[test]
    fn test_quality_events() {
        let (bus, sim, mut backend) = backend();
        sim.fire_ready();
        backend.set_playback_quality("hd720");
        assert_eq!(sim.calls(), vec![EmbedCall::Quality("hd720".into())]);
        assert_eq!(
            backend_events(&bus),
            vec![
                BackendEvent::Ready,
                BackendEvent::QualityChanged("hd720".into())
            ]
        );
    }
}
