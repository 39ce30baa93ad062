//! Simulated streaming embed.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::streaming::{
    STATE_CUED, STATE_ENDED, STATE_PAUSED, STATE_PLAYING, STATE_UNSTARTED,
};
use crate::backend::{StreamingCallbacks, StreamingEmbed};
use crate::config::PlayerVars;
use crate::entities::FixedTime;

/// Command received by the embed
#[derive(Clone, Debug, PartialEq)]
pub enum EmbedCall {
    Play,
    Pause,
    Seek(f64, bool),
    Volume(u8),
    /// Video id and start time exactly as passed
    Load(String, String),
    Cue(String, String),
    Quality(String),
}

#[derive(Debug)]
struct EmbedState {
    video_id: Option<String>,
    player_vars: Option<PlayerVars>,
    callbacks: Option<StreamingCallbacks>,
    calls: Vec<EmbedCall>,
    position: Option<f64>,
    duration: f64,
    state_code: i32,
    volume: u8,
}

/// Streaming embed that records commands and fires callbacks on demand.
///
/// Clones share state: hand one clone to the backend and drive the other.
/// Play and pause answer with the matching state callback right away,
/// like an embed that needs no buffering.
#[derive(Clone, Debug)]
pub struct SimulatedEmbed {
    state: Arc<Mutex<EmbedState>>,
}

impl SimulatedEmbed {
    pub fn new(duration: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(EmbedState {
                video_id: None,
                player_vars: None,
                callbacks: None,
                calls: Vec::new(),
                position: None,
                duration,
                state_code: STATE_UNSTARTED,
                volume: 100,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EmbedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn callbacks(&self) -> Option<StreamingCallbacks> {
        self.lock().callbacks.clone()
    }

    pub fn attached_video(&self) -> Option<String> {
        self.lock().video_id.clone()
    }

    pub fn attached_vars(&self) -> Option<PlayerVars> {
        self.lock().player_vars.clone()
    }

    pub fn calls(&self) -> Vec<EmbedCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Embed finished loading
    pub fn fire_ready(&self) {
        {
            let mut state = self.lock();
            if state.position.is_none() {
                state.position = Some(0.0);
            }
        }
        if let Some(cb) = self.callbacks() {
            cb.on_ready();
        }
    }

    /// Set the state code and report it
    pub fn fire_state(&self, code: i32) {
        self.lock().state_code = code;
        if let Some(cb) = self.callbacks() {
            cb.on_state_change(code);
        }
    }

    /// `None` makes the position unavailable
    pub fn set_position(&self, position: Option<f64>) {
        self.lock().position = position;
    }

    /// Move the playhead forward while playing; reports ENDED at the end.
    pub fn advance(&self, secs: f64) {
        let ended = {
            let mut state = self.lock();
            if state.state_code != STATE_PLAYING {
                return;
            }
            let pos = (state.position.unwrap_or(0.0) + secs).min(state.duration);
            state.position = Some(pos);
            pos >= state.duration
        };
        if ended {
            self.fire_state(STATE_ENDED);
        }
    }
}

impl StreamingEmbed for SimulatedEmbed {
    fn attach(&mut self, video_id: &str, player_vars: &PlayerVars, callbacks: StreamingCallbacks) {
        let mut state = self.lock();
        state.video_id = Some(video_id.to_string());
        state.player_vars = Some(player_vars.clone());
        state.callbacks = Some(callbacks);
    }

    fn play_video(&mut self) {
        self.lock().calls.push(EmbedCall::Play);
        self.fire_state(STATE_PLAYING);
    }

    fn pause_video(&mut self) {
        self.lock().calls.push(EmbedCall::Pause);
        self.fire_state(STATE_PAUSED);
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) {
        let mut state = self.lock();
        state.calls.push(EmbedCall::Seek(seconds, allow_seek_ahead));
        state.position = Some(seconds);
    }

    fn set_volume(&mut self, level: u8) {
        let mut state = self.lock();
        state.calls.push(EmbedCall::Volume(level));
        state.volume = level;
    }

    fn volume(&self) -> u8 {
        self.lock().volume
    }

    fn load_video_by_id(&mut self, video_id: &str, start: &FixedTime) {
        let mut state = self.lock();
        state
            .calls
            .push(EmbedCall::Load(video_id.to_string(), start.as_str().to_string()));
        state.video_id = Some(video_id.to_string());
        state.position = Some(start.secs());
    }

    fn cue_video_by_id(&mut self, video_id: &str, start: &FixedTime) {
        {
            let mut state = self.lock();
            state
                .calls
                .push(EmbedCall::Cue(video_id.to_string(), start.as_str().to_string()));
            state.video_id = Some(video_id.to_string());
            state.position = Some(start.secs());
        }
        self.fire_state(STATE_CUED);
    }

    fn current_time(&self) -> Option<f64> {
        self.lock().position
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn player_state(&self) -> i32 {
        self.lock().state_code
    }

    fn set_playback_quality(&mut self, quality: &str) {
        self.lock().calls.push(EmbedCall::Quality(quality.to_string()));
        if let Some(cb) = self.callbacks() {
            cb.on_playback_quality_change(quality);
        }
    }

    fn available_quality_levels(&self) -> Vec<String> {
        ["hd720", "large", "medium"].map(String::from).to_vec()
    }
}
