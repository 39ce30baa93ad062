//! Simulated native media element.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{MediaElement, MediaElementCallbacks, MediaEvent};

/// Command received by the element
#[derive(Clone, Debug, PartialEq)]
pub enum ElementCall {
    Source(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f64),
}

#[derive(Debug)]
struct ElementState {
    playable: Vec<String>,
    callbacks: Option<MediaElementCallbacks>,
    calls: Vec<ElementCall>,
    position: Option<f64>,
    duration: f64,
    volume: f64,
    playing: bool,
}

/// Media element that records commands and fires events on demand.
///
/// Clones share state. `play()`/`pause()` answer with `playing`/`pause`.
#[derive(Clone, Debug)]
pub struct SimulatedElement {
    state: Arc<Mutex<ElementState>>,
}

impl SimulatedElement {
    /// Element able to play the given MIME types
    pub fn new(playable: &[&str], duration: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ElementState {
                playable: playable.iter().map(|s| s.to_string()).collect(),
                callbacks: None,
                calls: Vec::new(),
                position: None,
                duration,
                volume: 1.0,
                playing: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<ElementCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Deliver a media event to the attached listener
    pub fn fire(&self, event: MediaEvent) {
        let callbacks = {
            let mut state = self.lock();
            match event {
                MediaEvent::CanPlay if state.position.is_none() => state.position = Some(0.0),
                MediaEvent::Playing => state.playing = true,
                MediaEvent::Pause | MediaEvent::Ended => state.playing = false,
                _ => {}
            }
            state.callbacks.clone()
        };
        if let Some(cb) = callbacks {
            cb.dispatch(event);
        }
    }

    pub fn set_position(&self, position: Option<f64>) {
        self.lock().position = position;
    }

    pub fn volume_level(&self) -> f64 {
        self.lock().volume
    }

    /// Move the playhead forward while playing; fires `ended` at the end.
    pub fn advance(&self, secs: f64) {
        let ended = {
            let mut state = self.lock();
            if !state.playing {
                return;
            }
            let pos = (state.position.unwrap_or(0.0) + secs).min(state.duration);
            state.position = Some(pos);
            pos >= state.duration
        };
        if ended {
            self.fire(MediaEvent::Ended);
        }
    }
}

impl MediaElement for SimulatedElement {
    fn attach(&mut self, callbacks: MediaElementCallbacks) {
        self.lock().callbacks = Some(callbacks);
    }

    fn can_play_type(&self, mime_type: &str) -> bool {
        self.lock().playable.iter().any(|m| m == mime_type)
    }

    /// Position is unknown until the new source is seeked or loaded
    fn set_source(&mut self, url: &str) {
        let mut state = self.lock();
        state.calls.push(ElementCall::Source(url.to_string()));
        state.position = None;
    }

    fn play(&mut self) {
        self.lock().calls.push(ElementCall::Play);
        self.fire(MediaEvent::Play);
        self.fire(MediaEvent::Playing);
    }

    fn pause(&mut self) {
        self.lock().calls.push(ElementCall::Pause);
        self.fire(MediaEvent::Pause);
    }

    fn set_current_time(&mut self, secs: f64) {
        let mut state = self.lock();
        state.calls.push(ElementCall::Seek(secs));
        state.position = Some(secs);
    }

    fn current_time(&self) -> Option<f64> {
        self.lock().position
    }

    fn duration(&self) -> Option<f64> {
        Some(self.lock().duration)
    }

    fn set_volume(&mut self, volume: f64) {
        let mut state = self.lock();
        state.calls.push(ElementCall::Volume(volume));
        state.volume = volume;
    }

    fn volume(&self) -> f64 {
        self.lock().volume
    }
}
