//! Video player controller - the one place cross-widget coordination happens.
//!
//! **Owns**: one backend, the poll `Updater`, the widgets, the per-player
//! event bus.
//!
//! **Used by**: the embedding host, which builds the parts, hands them over
//! and then calls `tick()` from its loop.
//!
//! # State machine
//!
//! Driven only by backend state callbacks, never by widgets:
//!
//! | entered   | effect                                                        |
//! |-----------|---------------------------------------------------------------|
//! | Unstarted | control + caption paused (reset)                              |
//! | Playing   | take active slot, (re)start poll, widgets playing, `play_video`|
//! | Paused    | stop poll, control + caption paused, `pause_video`            |
//! | Ended     | stop poll, control + caption paused, no analytics             |
//!
//! # Speed switches
//!
//! Each speed is its own encoded asset. Switching remaps the playhead by
//! `old / new` (kept as a 3-decimal string) and loads the new asset there
//! when playing, or cues it when not.
//!
//! # Time propagation
//!
//! Poll ticks, seeks and speed switches all publish through
//! `update_play_time()`, so label, captions and slider never disagree.

use log::{debug, info, trace, warn};
use std::time::Instant;
use uuid::Uuid;

use super::event_bus::EventBus;
use super::player_events::SeekKind;
use super::registry::{ActivePlayerRegistry, PlayerHandle};
use super::updater::{IntervalHandle, Updater};
use crate::backend::{Backend, PlaybackBackend, PlaybackState};
use crate::config::PlayerConfig;
use crate::entities::{AnalyticsEvent, PlaybackSpeed, VideoMetadata, progress_label, remap_time};
use crate::widgets::Widgets;

/// Qualities that light the HD indicator
const HD_QUALITIES: &[&str] = &["hd720", "hd1080", "highres"];

pub const FULLSCREEN_TITLE: &str = "Exit fill browser";
pub const WINDOWED_TITLE: &str = "Fill browser";

pub struct VideoPlayer {
    id: Uuid,
    pub(super) bus: EventBus,
    video: VideoMetadata,
    backend: Backend,
    widgets: Widgets,
    registry: ActivePlayerRegistry,
    updater: Updater,
    /// Host clock as of the last `tick_at()`; poll intervals are armed on it
    clock: Instant,
    hd_quality: String,
    sd_quality: String,
    /// Playhead in the current speed's timeline
    current_time: f64,
    fullscreen: bool,
    quality: Option<String>,
    last_state: Option<PlaybackState>,
    shut_down: bool,
}

impl VideoPlayer {
    /// Wire a player from its parts.
    ///
    /// `backend` and the widgets must have been built with emitters from
    /// `bus`. The player claims the registry slot if nobody holds it.
    pub fn new(
        video: VideoMetadata,
        bus: EventBus,
        backend: Backend,
        mut widgets: Widgets,
        registry: ActivePlayerRegistry,
        config: &PlayerConfig,
    ) -> Self {
        let id = Uuid::new_v4();

        if video.is_touch_device() && widgets.volume_control.take().is_some() {
            debug!("Player {}: touch device, volume control dropped", id);
        }
        widgets
            .speed_control
            .set_speeds(&video.speeds(), video.current_speed());
        widgets.caption.set_current_speed(video.current_speed());

        registry.claim_if_empty(PlayerHandle::new(id, bus.emitter()));

        info!(
            "Player {} created for video {} ({} backend, speed {})",
            id,
            video.id(),
            backend.kind(),
            video.current_speed()
        );

        Self {
            id,
            bus,
            video,
            backend,
            widgets,
            registry,
            updater: Updater::new(config.update_interval_ms),
            clock: Instant::now(),
            hd_quality: config.hd_quality.clone(),
            sd_quality: config.sd_quality.clone(),
            current_time: 0.0,
            fullscreen: false,
            quality: None,
            last_state: None,
            shut_down: false,
        }
    }

    // === Host loop ===

    /// Drain pending events, then run a poll if one is due.
    ///
    /// `now` is the host's clock. Intervals started while handling the
    /// events are armed on it too.
    pub fn tick_at(&mut self, now: Instant) {
        self.clock = now;
        self.process_events();
        if self.updater.poll_due(now) {
            self.update();
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Stop polling and give up the active slot. Also runs on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.updater.stop();
        self.registry.release(self.id);
        debug!("Player {} shut down", self.id);
    }

    // === Backend lifecycle ===

    pub fn on_ready(&mut self) {
        info!("Player {}: backend ready", self.id);
        self.video.log(&AnalyticsEvent::LoadVideo);

        if self.video.duration() <= 0.0 {
            let duration = self.backend.duration();
            if duration > 0.0 {
                debug!("Player {}: duration {} from backend", self.id, duration);
                self.video.set_duration(duration);
            }
        }
        if self.backend.available_quality_levels().is_empty()
            && self.widgets.quality_control.take().is_some()
        {
            debug!("Player {}: no quality levels, quality control dropped", self.id);
        }

        let volume = self.backend.volume();
        if let Some(volume_control) = self.widgets.volume_control.as_mut() {
            volume_control.set_volume(volume);
        }

        if self.video.is_touch_device() {
            debug!("Player {}: touch device, waiting for user to start", self.id);
        } else {
            self.play();
        }
    }

    pub fn on_state_change(&mut self, state: PlaybackState) {
        debug!(
            "Player {}: {} -> {}",
            self.id,
            self.last_state.map_or("none", |s| s.as_str()),
            state.as_str()
        );
        self.last_state = Some(state);
        match state {
            PlaybackState::Unstarted => {
                self.widgets.control.pause();
                self.widgets.caption.pause();
            }
            PlaybackState::Playing => self.on_play(),
            PlaybackState::Paused => self.on_pause(),
            PlaybackState::Ended => self.on_ended(),
        }
    }

    fn on_play(&mut self) {
        if let Some(prev) = self.registry.activate(self.handle()) {
            debug!("Player {}: asked player {} to pause", self.id, prev);
        }
        let interval = self.updater.start(self.clock);
        trace!("Player {}: poll {} started", self.id, interval);

        self.widgets.control.play();
        self.widgets.caption.play();
        self.widgets.progress_slider.play();
        self.video.log(&AnalyticsEvent::PlayVideo {
            current_time: self.current_time,
        });
    }

    fn on_pause(&mut self) {
        self.updater.stop();
        self.widgets.control.pause();
        self.widgets.caption.pause();
        self.video.log(&AnalyticsEvent::PauseVideo {
            current_time: self.current_time,
        });
    }

    /// Same visuals as a pause, but not a user pause: no analytics.
    fn on_ended(&mut self) {
        self.updater.stop();
        self.widgets.control.pause();
        self.widgets.caption.pause();
    }

    pub fn on_quality_change(&mut self, quality: &str) {
        debug!("Player {}: quality {}", self.id, quality);
        let hd = HD_QUALITIES.contains(&quality);
        if let Some(quality_control) = self.widgets.quality_control.as_mut() {
            quality_control.set_hd(hd);
        }
        self.quality = Some(quality.to_string());
    }

    // === Widget requests ===

    pub fn on_seek(&mut self, time: f64, kind: SeekKind) {
        if !time.is_finite() {
            warn!("Player {}: seek to {} ignored", self.id, time);
            return;
        }
        let time = time.max(0.0);
        let old_time = self.current_time;
        self.current_time = time;
        self.backend.seek_to(time, true);

        if self.is_playing() {
            // Drop the interval armed before the jump
            let interval = self.updater.start(self.clock);
            trace!("Player {}: poll restarted as {} after seek", self.id, interval);
        }
        self.update_play_time(time);

        self.video.log(&AnalyticsEvent::SeekVideo {
            old_time,
            new_time: time,
            kind,
        });
    }

    pub fn on_speed_change(&mut self, speed: &PlaybackSpeed, explicit: bool) {
        let Some(media_id) = self.video.media_id_for(speed).map(str::to_owned) else {
            warn!("Player {}: no stream for speed {}", self.id, speed);
            return;
        };
        let old_speed = self.video.current_speed().clone();
        let new_time = remap_time(self.current_time, &old_speed, speed);

        self.video.log(&AnalyticsEvent::SpeedChangeVideo {
            current_time: self.current_time,
            old_speed: old_speed.clone(),
            new_speed: speed.clone(),
        });

        self.video.set_speed(speed, explicit);
        self.widgets.caption.set_current_speed(speed);
        self.current_time = new_time.secs();

        if self.is_playing() {
            self.backend.load_by_id(&media_id, &new_time);
        } else {
            self.backend.cue_by_id(&media_id, &new_time);
        }
        info!(
            "Player {}: speed {} -> {}, playhead {}",
            self.id, old_speed, speed, new_time
        );
        self.update_play_time(new_time.secs());
    }

    pub fn on_volume_change(&mut self, level: u8) {
        self.backend.set_volume(level);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        let (event, title) = if self.fullscreen {
            (
                AnalyticsEvent::Fullscreen {
                    current_time: self.current_time,
                },
                FULLSCREEN_TITLE,
            )
        } else {
            (
                AnalyticsEvent::NotFullscreen {
                    current_time: self.current_time,
                },
                WINDOWED_TITLE,
            )
        };
        self.widgets
            .fullscreen_button
            .set_fullscreen(self.fullscreen, title);
        self.video.log(&event);
        self.widgets.caption.resize();
    }

    /// Escape only ever leaves fullscreen
    pub fn on_escape(&mut self) {
        if self.fullscreen {
            self.toggle_fullscreen();
        }
    }

    pub fn toggle_quality(&mut self) {
        let hd_now = self
            .quality
            .as_deref()
            .is_some_and(|q| HD_QUALITIES.contains(&q));
        let target = if hd_now {
            self.sd_quality.clone()
        } else {
            self.hd_quality.clone()
        };
        debug!("Player {}: requesting quality {}", self.id, target);
        self.backend.set_playback_quality(&target);
    }

    // === Time propagation ===

    /// One poll tick. Skipped entirely when the backend has no position.
    pub fn update(&mut self) {
        match self.backend.current_time() {
            Some(time) => {
                self.current_time = time;
                self.update_play_time(time);
            }
            None => trace!("Player {}: no position this tick", self.id),
        }
    }

    pub fn update_play_time(&mut self, time: f64) {
        let duration = self.duration();
        self.widgets
            .control
            .set_time_label(&progress_label(time, duration));
        self.widgets.caption.update_play_time(time);
        self.widgets.progress_slider.update_play_time(time, duration);
    }

    // === Accessors ===

    /// Start playback. Does nothing until the backend is ready.
    pub fn play(&mut self) {
        self.backend.play();
    }

    pub fn pause(&mut self) {
        self.backend.pause();
    }

    /// Backend reports PLAYING. Independent of timer and playhead.
    pub fn is_playing(&self) -> bool {
        self.backend.player_state() == Some(PlaybackState::Playing)
    }

    /// Duration from metadata (known before the backend is ready)
    pub fn duration(&self) -> f64 {
        self.video.duration()
    }

    pub fn current_speed(&self) -> &PlaybackSpeed {
        self.video.current_speed()
    }

    pub fn volume(&self) -> u8 {
        self.backend.volume()
    }

    pub fn set_volume(&mut self, level: u8) {
        self.backend.set_volume(level);
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn quality(&self) -> Option<&str> {
        self.quality.as_deref()
    }

    /// Running poll interval; present only while playing
    pub fn interval(&self) -> Option<IntervalHandle> {
        self.updater.handle()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn video(&self) -> &VideoMetadata {
        &self.video
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Bus handle for hosts that observe events
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    fn handle(&self) -> PlayerHandle {
        PlayerHandle::new(self.id, self.bus.emitter())
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
