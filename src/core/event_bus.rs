//! Pub/sub bus carrying slider notifications to consumers.
//!
//! - Subscribers receive events synchronously inside `emit()`
//! - Every emitted event is also queued; `poll()` hands the queue to a
//!   host loop that prefers batch processing
//!
//! Callbacks for one event type fire in subscription order. Order across
//! different event types is the emission order of the queue only.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

/// Queue length at which the oldest half is dropped.
const MAX_QUEUE_SIZE: usize = 1000;

pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

pub type BoxedEvent = Box<dyn Event>;

/// Shared state behind the bus and every emitter cloned from it.
#[derive(Clone, Default)]
struct Channels {
    subscribers: Arc<RwLock<HashMap<TypeId, Vec<Callback>>>>,
    queue: Arc<Mutex<Vec<BoxedEvent>>>,
}

impl Channels {
    fn publish<E: Event>(&self, event: E) {
        if let Some(cbs) = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&TypeId::of::<E>())
        {
            for cb in cbs {
                cb(&event);
            }
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict = queue.len() / 2;
            warn!("Event queue full ({} events), dropping oldest {}", queue.len(), evict);
            queue.drain(0..evict);
        }
        queue.push(Box::new(event));
    }
}

/// Owner side of the bus: subscribe, emit, poll.
#[derive(Clone, Default)]
pub struct EventBus {
    channels: Channels,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for events of type `E`.
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
        self.channels
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event>(&self, event: E) {
        self.channels.publish(event);
    }

    /// Take every event queued since the last poll.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.channels.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Emitter handle for the control.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            channels: self.channels.clone(),
        }
    }

    pub fn unsubscribe_all<E: Event>(&self) {
        self.channels
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&TypeId::of::<E>());
    }

    pub fn queue_len(&self) -> usize {
        self.channels.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Cloneable publishing handle. Implements `TrimObserver`.
#[derive(Clone)]
pub struct EventEmitter {
    channels: Channels,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscriber_types", &self.channels.subscribers.read().map(|s| s.len()).unwrap_or(0))
            .field("queue_len", &self.channels.queue.lock().map(|q| q.len()).unwrap_or(0))
            .finish()
    }
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        self.channels.publish(event);
    }
}

/// Downcast a polled event.
///
/// Deref to `dyn Event` first: calling `as_any()` on the box itself hits
/// the blanket impl for `Box<dyn Event>` and the downcast always fails.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slider_events::{PlayheadChangedEvent, RangeChangedEvent, TrimObserver};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscriber_called_on_emit() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        bus.subscribe::<PlayheadChangedEvent, _>(move |e| {
            s.lock().unwrap().push(e.0);
        });

        bus.emit(PlayheadChangedEvent(1.5));
        bus.emit(PlayheadChangedEvent(2.0));
        assert_eq!(*seen.lock().unwrap(), vec![1.5, 2.0]);
    }

    #[test]
    fn test_emit_queues_for_poll() {
        let bus = EventBus::new();
        bus.emit(PlayheadChangedEvent(1.0));
        bus.emit(RangeChangedEvent { start: 0.0, end: 4.0 });

        let events = bus.poll();
        assert_eq!(events.len(), 2);
        assert_eq!(
            downcast_event::<RangeChangedEvent>(&events[1]),
            Some(&RangeChangedEvent { start: 0.0, end: 4.0 })
        );
        assert!(downcast_event::<RangeChangedEvent>(&events[0]).is_none());
        assert_eq!(bus.poll().len(), 0);
    }

    #[test]
    fn test_emitter_as_observer() {
        let bus = EventBus::new();
        let ranges = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ranges);
        bus.subscribe::<RangeChangedEvent, _>(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        });

        let mut observer = bus.emitter();
        observer.range_changed(1.0, 3.0);
        observer.playhead_changed(1.0);
        observer.drag_began();

        assert_eq!(ranges.load(Ordering::SeqCst), 1);
        assert_eq!(bus.queue_len(), 3);
    }

    #[test]
    fn test_unsubscribe_keeps_queueing() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        bus.subscribe::<PlayheadChangedEvent, _>(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(PlayheadChangedEvent(0.0));
        bus.unsubscribe_all::<PlayheadChangedEvent>();
        bus.emit(PlayheadChangedEvent(0.0));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.poll().len(), 2);
    }

    #[test]
    fn test_queue_eviction() {
        let bus = EventBus::new();
        for i in 0..MAX_QUEUE_SIZE + 1 {
            bus.emit(PlayheadChangedEvent(i as f64));
        }
        assert_eq!(bus.queue_len(), MAX_QUEUE_SIZE / 2 + 1);
    }
}
