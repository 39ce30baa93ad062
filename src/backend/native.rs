//! Native media element backend.
//!
//! Wraps a platform media element (the `<video>` tag or equivalent). Each
//! media id maps to a list of encodings; the first one the element reports
//! it can play is used. Element events are reduced to the four playback
//! states; everything else the element reports is ignored.

use anyhow::{Result, bail};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{PlaybackBackend, PlaybackState};
use crate::core::event_bus::EventEmitter;
use crate::core::player_events::BackendEvent;
use crate::entities::FixedTime;

/// One encoding of a media asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    pub url: String,
    pub mime_type: String,
}

impl MediaSource {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Media id -> encodings in preference order
pub type NativeSources = IndexMap<String, Vec<MediaSource>>;

/// Media element events the backend listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    LoadedMetadata,
    CanPlay,
    Play,
    Playing,
    Pause,
    Seeking,
    Seeked,
    Waiting,
    Ended,
    TimeUpdate,
}

impl MediaEvent {
    /// Parse a DOM media event name ("canplay", "playing", ...)
    pub fn from_dom_name(name: &str) -> Option<Self> {
        Some(match name {
            "loadedmetadata" => MediaEvent::LoadedMetadata,
            "canplay" => MediaEvent::CanPlay,
            "play" => MediaEvent::Play,
            "playing" => MediaEvent::Playing,
            "pause" => MediaEvent::Pause,
            "seeking" => MediaEvent::Seeking,
            "seeked" => MediaEvent::Seeked,
            "waiting" => MediaEvent::Waiting,
            "ended" => MediaEvent::Ended,
            "timeupdate" => MediaEvent::TimeUpdate,
            _ => return None,
        })
    }
}

/// Raw media element API, implemented by the host (or `sim::SimulatedElement`).
pub trait MediaElement {
    /// Register the event listener
    fn attach(&mut self, callbacks: MediaElementCallbacks);
    fn can_play_type(&self, mime_type: &str) -> bool;
    fn set_source(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_current_time(&mut self, secs: f64);
    /// `None` until metadata is loaded
    fn current_time(&self) -> Option<f64>;
    fn duration(&self) -> Option<f64>;
    /// 0.0..=1.0
    fn set_volume(&mut self, volume: f64);
    fn volume(&self) -> f64;
}

#[derive(Debug)]
struct Shared {
    ready: AtomicBool,
    state: Mutex<PlaybackState>,
}

/// Event listener handed to the element.
#[derive(Clone, Debug)]
pub struct MediaElementCallbacks {
    emitter: EventEmitter,
    shared: Arc<Shared>,
}

impl MediaElementCallbacks {
    pub fn dispatch(&self, event: MediaEvent) {
        let state = match event {
            MediaEvent::CanPlay => {
                if !self.shared.ready.swap(true, Ordering::SeqCst) {
                    self.emitter.emit(BackendEvent::Ready);
                }
                return;
            }
            MediaEvent::Playing => PlaybackState::Playing,
            MediaEvent::Pause => PlaybackState::Paused,
            MediaEvent::Ended => PlaybackState::Ended,
            other => {
                trace!("Media element: {:?} ignored", other);
                return;
            }
        };
        *self.shared.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        self.emitter.emit(BackendEvent::StateChanged(state));
    }
}

pub struct NativeMediaBackend {
    element: Box<dyn MediaElement>,
    sources: NativeSources,
    shared: Arc<Shared>,
}

impl NativeMediaBackend {
    /// Attach to `element` and load `media_id`'s first playable source.
    ///
    /// Errors if `media_id` has no source the element can play.
    pub fn new(
        mut element: Box<dyn MediaElement>,
        sources: NativeSources,
        media_id: &str,
        emitter: EventEmitter,
    ) -> Result<Self> {
        let Some(url) = playable_source(element.as_ref(), &sources, media_id) else {
            bail!("No playable source for media '{}'", media_id);
        };
        let shared = Arc::new(Shared {
            ready: AtomicBool::new(false),
            state: Mutex::new(PlaybackState::Unstarted),
        });
        element.attach(MediaElementCallbacks {
            emitter,
            shared: Arc::clone(&shared),
        });
        debug!("Native backend: source {}", url);
        element.set_source(&url);

        Ok(Self {
            element,
            sources,
            shared,
        })
    }

    fn ready_for(&self, command: &str) -> bool {
        let ready = self.is_ready();
        if !ready {
            trace!("Native backend: {} before ready, ignored", command);
        }
        ready
    }

    /// Point the element at `media_id` and move to `start`.
    /// Returns false if the media has no playable source.
    fn switch_media(&mut self, media_id: &str, start: &FixedTime) -> bool {
        let Some(url) = playable_source(self.element.as_ref(), &self.sources, media_id) else {
            warn!("Native backend: no playable source for '{}'", media_id);
            return false;
        };
        debug!("Native backend: switch to {} at {}", url, start);
        self.element.set_source(&url);
        self.element.set_current_time(start.secs());
        true
    }
}

fn playable_source(
    element: &dyn MediaElement,
    sources: &NativeSources,
    media_id: &str,
) -> Option<String> {
    sources
        .get(media_id)?
        .iter()
        .find(|s| element.can_play_type(&s.mime_type))
        .map(|s| s.url.clone())
}

/// Check that `element` can play every one of `media_ids`.
///
/// Speed switches load other media ids later on; one the element cannot
/// play would leave it on the old asset while the controller moved on.
pub fn require_playable<'a>(
    element: &dyn MediaElement,
    sources: &NativeSources,
    media_ids: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let missing: Vec<&str> = media_ids
        .into_iter()
        .filter(|id| playable_source(element, sources, id).is_none())
        .collect();
    if !missing.is_empty() {
        bail!("No playable source for media {}", missing.join(", "));
    }
    Ok(())
}

impl PlaybackBackend for NativeMediaBackend {
    fn kind(&self) -> &'static str {
        "native"
    }

    fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst)
    }

    fn play(&mut self) {
        if self.ready_for("play") {
            self.element.play();
        }
    }

    fn pause(&mut self) {
        if self.ready_for("pause") {
            self.element.pause();
        }
    }

    /// Elements always seek within what they can fetch
    fn seek_to(&mut self, time: f64, _allow_seek_ahead: bool) {
        if self.ready_for("seek") {
            self.element.set_current_time(time.max(0.0));
        }
    }

    fn set_volume(&mut self, level: u8) {
        if self.ready_for("set_volume") {
            self.element.set_volume(f64::from(level.min(100)) / 100.0);
        }
    }

    fn volume(&self) -> u8 {
        if !self.is_ready() {
            return 0;
        }
        (self.element.volume().clamp(0.0, 1.0) * 100.0).round() as u8
    }

    fn load_by_id(&mut self, media_id: &str, start: &FixedTime) {
        if self.ready_for("load") && self.switch_media(media_id, start) {
            self.element.play();
        }
    }

    fn cue_by_id(&mut self, media_id: &str, start: &FixedTime) {
        if self.ready_for("cue") {
            self.switch_media(media_id, start);
        }
    }

    fn current_time(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        self.element.current_time().filter(|t| t.is_finite() && *t >= 0.0)
    }

    fn duration(&self) -> f64 {
        self.element
            .duration()
            .filter(|d| d.is_finite())
            .unwrap_or(0.0)
    }

    fn player_state(&self) -> Option<PlaybackState> {
        Some(*self.shared.state.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{EventBus, downcast_event};
    use crate::sim::{ElementCall, SimulatedElement};

    fn sources() -> NativeSources {
        let mut sources = NativeSources::new();
        sources.insert(
            "normal".to_string(),
            vec![
                MediaSource::new("/v/normal.ogv", "video/ogg"),
                MediaSource::new("/v/normal.mp4", "video/mp4"),
            ],
        );
        sources.insert(
            "slow".to_string(),
            vec![MediaSource::new("/v/slow.mp4", "video/mp4")],
        );
        sources
    }

    fn backend() -> (EventBus, SimulatedElement, NativeMediaBackend) {
        let bus = EventBus::new();
        let sim = SimulatedElement::new(&["video/mp4"], 600.0);
        let backend =
            NativeMediaBackend::new(Box::new(sim.clone()), sources(), "normal", bus.emitter())
                .unwrap();
        (bus, sim, backend)
    }

    fn backend_events(bus: &EventBus) -> Vec<BackendEvent> {
        bus.poll()
            .iter()
            .filter_map(|e| downcast_event::<BackendEvent>(e).cloned())
            .collect()
    }

    #[test]
    fn test_picks_first_playable_source() {
        let (_, sim, _) = backend();
        assert_eq!(sim.calls(), vec![ElementCall::Source("/v/normal.mp4".into())]);
    }

    #[test]
    fn test_no_playable_source_is_an_error() {
        let bus = EventBus::new();
        let sim = SimulatedElement::new(&["video/webm"], 600.0);
        let result = NativeMediaBackend::new(Box::new(sim), sources(), "normal", bus.emitter());
        assert!(result.is_err());
    }

    #[test]
    fn test_every_media_id_must_be_playable() {
        let sim = SimulatedElement::new(&["video/mp4"], 600.0);
        let mut sources = sources();
        assert!(require_playable(&sim, &sources, ["normal", "slow"]).is_ok());

        sources.insert(
            "fast".to_string(),
            vec![MediaSource::new("/v/fast.webm", "video/webm")],
        );
        let err = require_playable(&sim, &sources, ["normal", "fast", "missing"]).unwrap_err();
        assert_eq!(err.to_string(), "No playable source for media fast, missing");
    }

    #[test]
    fn test_dom_event_names() {
        assert_eq!(MediaEvent::from_dom_name("canplay"), Some(MediaEvent::CanPlay));
        assert_eq!(MediaEvent::from_dom_name("ended"), Some(MediaEvent::Ended));
        assert_eq!(MediaEvent::from_dom_name("volumechange"), None);
    }

    #[test]
    fn test_event_translation() {
        let (bus, sim, backend) = backend();
        sim.fire(MediaEvent::CanPlay);
        sim.fire(MediaEvent::CanPlay);
        sim.fire(MediaEvent::Play);
        sim.fire(MediaEvent::Playing);
        sim.fire(MediaEvent::TimeUpdate);
        sim.fire(MediaEvent::Ended);
        assert_eq!(
            backend_events(&bus),
            vec![
                BackendEvent::Ready,
                BackendEvent::StateChanged(PlaybackState::Playing),
                BackendEvent::StateChanged(PlaybackState::Ended),
            ]
        );
        assert_eq!(backend.player_state(), Some(PlaybackState::Ended));
    }

    #[test]
    fn test_volume_scaling() {
        let (_, sim, mut backend) = backend();
        sim.fire(MediaEvent::CanPlay);
        backend.set_volume(60);
        assert_eq!(sim.volume_level(), 0.6);
        assert_eq!(backend.volume(), 60);
    }

    #[test]
    fn test_load_switches_source_and_plays() {
        let (_, sim, mut backend) = backend();
        sim.fire(MediaEvent::CanPlay);
        sim.clear_calls();
        backend.load_by_id("slow", &FixedTime::from_secs(80.0));
        assert_eq!(
            sim.calls(),
            vec![
                ElementCall::Source("/v/slow.mp4".into()),
                ElementCall::Seek(80.0),
                ElementCall::Play,
            ]
        );
    }

    #[test]
    fn test_cue_does_not_play() {
        let (_, sim, mut backend) = backend();
        sim.fire(MediaEvent::CanPlay);
        sim.clear_calls();
        backend.cue_by_id("slow", &FixedTime::from_secs(80.0));
        assert_eq!(
            sim.calls(),
            vec![ElementCall::Source("/v/slow.mp4".into()), ElementCall::Seek(80.0)]
        );
        // Unknown media: nothing happens
        sim.clear_calls();
        backend.cue_by_id("missing", &FixedTime::from_secs(1.0));
        assert!(sim.calls().is_empty());
    }

    #[test]
    fn test_current_time_unavailable_until_ready() {
        let (_, sim, backend) = backend();
        sim.set_position(Some(12.5));
        assert_eq!(backend.current_time(), None);
        sim.fire(MediaEvent::CanPlay);
        assert_eq!(backend.current_time(), Some(12.5));
        sim.set_position(None);
        assert_eq!(backend.current_time(), None);
    }
}
