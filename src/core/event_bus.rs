//! Per-controller event bus: widgets and backend in, controller out.
//!
//! Architecture:
//! - Each `VideoPlayer` owns one bus; widgets and the backend get an
//!   `EventEmitter` handle to it when they are built
//! - emit() runs immediate observers, then queues the event
//! - The controller drains the queue in `process_events()`, so a handler
//!   never runs while another handler of the same controller is on the stack
//!
//! Observer order: FIFO (first-subscribed, first-called) within one event type.
//! Queue order is emit order across all types.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Events dropped past this many undrained entries (oldest half evicted)
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

// Blanket impl for all qualifying types
impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Type-erased observer
type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

#[derive(Default)]
struct Shared {
    observers: RwLock<HashMap<TypeId, Vec<Callback>>>,
    queue: Mutex<Vec<BoxedEvent>>,
}

impl Shared {
    fn emit<E: Event>(&self, event: E) {
        let type_id = TypeId::of::<E>();

        if let Some(cbs) = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&type_id)
        {
            for cb in cbs {
                cb(&event);
            }
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!(
                "Player event queue full ({} events), evicting oldest {}",
                queue.len(),
                evict_count
            );
            queue.drain(0..evict_count);
        }
        queue.push(Box::new(event));
    }
}

/// Event bus owned by one controller.
///
/// Cloning shares the same queue and observers.
#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe events of type E as they are emitted.
    ///
    /// Observers see the event before the controller does. They are for
    /// hosts (logging, test probes), not for driving the controller.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.shared
            .observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    /// Emit on the bus (same as through an emitter)
    pub fn emit<E: Event>(&self, event: E) {
        self.shared.emit(event);
    }

    /// Take every queued event, oldest first.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.shared.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Handle for widgets, backends and other players.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Emit-only handle to a controller's bus.
#[derive(Clone)]
pub struct EventEmitter {
    shared: Arc<Shared>,
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        self.shared.emit(event);
    }

    /// True if both handles feed the same bus
    pub fn same_bus(&self, other: &EventEmitter) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field(
                "queue_len",
                &self.shared.queue.lock().map(|q| q.len()).unwrap_or(0),
            )
            .finish()
    }
}

/// Helper: downcast BoxedEvent to concrete type
///
/// Must deref to `dyn Event` before calling `as_any()`: `Box<dyn Event>` is
/// itself an `Event` through the blanket impl, and its `as_any()` would hand
/// back the box rather than the event inside.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player_events::{
        PauseRequested, SeekKind, SeekRequested, VolumeChangeRequested,
    };
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_emit_queues_in_order() {
        let bus = EventBus::new();
        bus.emit(VolumeChangeRequested(10));
        bus.emit(PauseRequested);
        bus.emit(VolumeChangeRequested(20));

        let events = bus.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(downcast_event::<VolumeChangeRequested>(&events[0]).map(|v| v.0), Some(10));
        assert!(downcast_event::<PauseRequested>(&events[1]).is_some());
        assert_eq!(downcast_event::<VolumeChangeRequested>(&events[2]).map(|v| v.0), Some(20));

        // Queue is empty after poll
        assert_eq!(bus.poll().len(), 0);
    }

    #[test]
    fn test_observer_sees_event_before_poll() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicI32::new(0));
        let s = Arc::clone(&seen);
        bus.subscribe::<SeekRequested, _>(move |e| {
            s.fetch_add(e.time as i32, Ordering::SeqCst);
        });

        bus.emit(SeekRequested {
            time: 60.0,
            kind: SeekKind::Slide,
        });
        assert_eq!(seen.load(Ordering::SeqCst), 60);
        assert_eq!(bus.queue_len(), 1);
    }

    #[test]
    fn test_emitter_feeds_owning_bus() {
        let bus = EventBus::new();
        let other = EventBus::new();
        let emitter = bus.emitter();

        emitter.emit(PauseRequested);
        assert_eq!(bus.queue_len(), 1);
        assert_eq!(other.queue_len(), 0);

        assert!(emitter.same_bus(&bus.emitter()));
        assert!(!emitter.same_bus(&other.emitter()));
    }

    #[test]
    fn test_downcast_wrong_type() {
        let bus = EventBus::new();
        bus.emit(PauseRequested);
        let events = bus.poll();
        assert!(downcast_event::<VolumeChangeRequested>(&events[0]).is_none());
    }

    #[test]
    fn test_queue_eviction() {
        let bus = EventBus::new();
        for i in 0..(MAX_QUEUE_SIZE + 1) {
            bus.emit(VolumeChangeRequested((i % 100) as u8));
        }
        assert_eq!(bus.queue_len(), MAX_QUEUE_SIZE / 2 + 1);
    }
}
