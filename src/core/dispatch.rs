//! Event handling for VideoPlayer.
//!
//! Drains the player's bus and routes each event to its handler. Handlers
//! may cause new events (a `play()` makes the backend report PLAYING, which
//! may pause another player), so the bus is drained until it stays quiet.

use log::{trace, warn};

use super::event_bus::downcast_event;
use super::player::VideoPlayer;
use super::player_events::*;

/// Drain rounds per `process_events()` before leftovers wait for the next tick
const MAX_DRAIN_ROUNDS: usize = 16;

impl VideoPlayer {
    /// Handle all pending events from the bus. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        for _ in 0..MAX_DRAIN_ROUNDS {
            let events = self.bus.poll();
            if events.is_empty() {
                return handled;
            }
            handled += events.len();
            for event in events {
                // === Backend lifecycle ===
                if let Some(e) = downcast_event::<BackendEvent>(&event) {
                    match e {
                        BackendEvent::Ready => self.on_ready(),
                        BackendEvent::StateChanged(state) => self.on_state_change(*state),
                        BackendEvent::QualityChanged(q) => self.on_quality_change(q),
                    }
                    continue;
                }

                // === Transport ===
                if downcast_event::<PlayRequested>(&event).is_some() {
                    self.play();
                    continue;
                }
                if downcast_event::<PauseRequested>(&event).is_some() {
                    self.pause();
                    continue;
                }

                // === Seek / speed / volume ===
                if let Some(e) = downcast_event::<SeekRequested>(&event) {
                    self.on_seek(e.time, e.kind);
                    continue;
                }
                if let Some(e) = downcast_event::<SpeedChangeRequested>(&event) {
                    self.on_speed_change(&e.speed, e.explicit);
                    continue;
                }
                if let Some(e) = downcast_event::<VolumeChangeRequested>(&event) {
                    self.on_volume_change(e.0);
                    continue;
                }
                if downcast_event::<QualityToggleRequested>(&event).is_some() {
                    self.toggle_quality();
                    continue;
                }

                // === Presentation ===
                if downcast_event::<FullscreenToggleRequested>(&event).is_some() {
                    self.toggle_fullscreen();
                    continue;
                }
                if downcast_event::<EscapeReleased>(&event).is_some() {
                    self.on_escape();
                    continue;
                }

                trace!("Player {}: unhandled event", self.id());
            }
        }
        warn!(
            "Player {}: events still pending after {} rounds",
            self.id(),
            MAX_DRAIN_ROUNDS
        );
        handled
    }
}
