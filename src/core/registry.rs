//! Active player registry - one playing player per process.
//!
//! A single slot holding the last player to start playing. When a player
//! takes the slot from another one, the previous holder gets a
//! `PauseRequested` on its own bus; it is a notification, not a handshake.
//! Players never hold references to each other, only to the registry.

use log::debug;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::event_bus::EventEmitter;
use super::player_events::PauseRequested;

static GLOBAL: Lazy<ActivePlayerRegistry> = Lazy::new(ActivePlayerRegistry::new);

/// What the registry keeps for a player: its id and a way to reach its bus.
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    id: Uuid,
    emitter: EventEmitter,
}

impl PlayerHandle {
    pub fn new(id: Uuid, emitter: EventEmitter) -> Self {
        Self { id, emitter }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn request_pause(&self) {
        self.emitter.emit(PauseRequested);
    }
}

/// Shared single-slot registry. Clones refer to the same slot.
#[derive(Clone, Debug, Default)]
pub struct ActivePlayerRegistry {
    slot: Arc<Mutex<Option<PlayerHandle>>>,
}

impl ActivePlayerRegistry {
    /// Fresh, empty registry (one per page / test)
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry for hosts that embed several players
    pub fn global() -> ActivePlayerRegistry {
        GLOBAL.clone()
    }

    /// Id of the player currently holding the slot
    pub fn active(&self) -> Option<Uuid> {
        self.lock().as_ref().map(PlayerHandle::id)
    }

    /// Take the slot only if nobody holds it. Returns true if taken.
    pub fn claim_if_empty(&self, handle: PlayerHandle) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        debug!("Registry: player {} claimed empty slot", handle.id);
        *slot = Some(handle);
        true
    }

    /// Record `handle` as the playing player.
    ///
    /// A different previous holder is told to pause first; its id is
    /// returned. Re-activating the current holder notifies nobody.
    pub fn activate(&self, handle: PlayerHandle) -> Option<Uuid> {
        let mut slot = self.lock();
        let paused = match slot.as_ref() {
            Some(prev) if prev.id != handle.id => {
                debug!("Registry: player {} pauses player {}", handle.id, prev.id);
                prev.request_pause();
                Some(prev.id)
            }
            _ => None,
        };
        *slot = Some(handle);
        paused
    }

    /// Empty the slot if `id` holds it (player teardown)
    pub fn release(&self, id: Uuid) -> bool {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|h| h.id == id) {
            debug!("Registry: player {} released slot", id);
            *slot = None;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PlayerHandle>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{EventBus, downcast_event};

    fn player() -> (EventBus, PlayerHandle) {
        let bus = EventBus::new();
        let handle = PlayerHandle::new(Uuid::new_v4(), bus.emitter());
        (bus, handle)
    }

    fn pause_count(bus: &EventBus) -> usize {
        bus.poll()
            .iter()
            .filter(|e| downcast_event::<PauseRequested>(e).is_some())
            .count()
    }

    #[test]
    fn test_claim_if_empty() {
        let registry = ActivePlayerRegistry::new();
        let (_, a) = player();
        let (_, b) = player();
        assert!(registry.claim_if_empty(a.clone()));
        assert!(!registry.claim_if_empty(b));
        assert_eq!(registry.active(), Some(a.id()));
    }

    #[test]
    fn test_activate_pauses_previous_once() {
        let registry = ActivePlayerRegistry::new();
        let (bus_a, a) = player();
        let (bus_b, b) = player();

        assert_eq!(registry.activate(a.clone()), None);
        assert_eq!(registry.activate(b.clone()), Some(a.id()));
        assert_eq!(registry.active(), Some(b.id()));

        assert_eq!(pause_count(&bus_a), 1);
        assert_eq!(pause_count(&bus_b), 0);
    }

    #[test]
    fn test_reactivate_self_is_silent() {
        let registry = ActivePlayerRegistry::new();
        let (bus_a, a) = player();
        registry.activate(a.clone());
        assert_eq!(registry.activate(a.clone()), None);
        assert_eq!(pause_count(&bus_a), 0);
    }

    #[test]
    fn test_release_only_by_holder() {
        let registry = ActivePlayerRegistry::new();
        let (_, a) = player();
        let (_, b) = player();
        registry.activate(a.clone());
        assert!(!registry.release(b.id()));
        assert!(registry.release(a.id()));
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn test_clones_share_slot() {
        let registry = ActivePlayerRegistry::new();
        let view = registry.clone();
        let (_, a) = player();
        registry.activate(a.clone());
        assert_eq!(view.active(), Some(a.id()));
    }
}
