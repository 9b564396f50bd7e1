//! Trim slider notifications.
//!
//! The control reports through a [`TrimObserver`]. Lifecycle hooks have
//! no-op defaults so an observer only implements what it consumes.
//! [`EventEmitter`] implements the observer by publishing the event
//! structs below on the bus.

use serde::Serialize;

use super::event_bus::EventEmitter;

/// Selection changed. Values in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RangeChangedEvent {
    pub start: f64,
    pub end: f64,
}

/// Playhead moved. Value in seconds; consumers typically seek to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayheadChangedEvent(pub f64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DragBeganEvent;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DragEndedEvent;

pub trait TrimObserver {
    fn range_changed(&mut self, start: f64, end: f64);

    fn playhead_changed(&mut self, seconds: f64);

    fn drag_began(&mut self) {}

    fn drag_ended(&mut self) {}
}

/// Observer that drops everything (control created before a consumer).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl TrimObserver for NullObserver {
    fn range_changed(&mut self, _start: f64, _end: f64) {}

    fn playhead_changed(&mut self, _seconds: f64) {}
}

impl TrimObserver for EventEmitter {
    fn range_changed(&mut self, start: f64, end: f64) {
        self.emit(RangeChangedEvent { start, end });
    }

    fn playhead_changed(&mut self, seconds: f64) {
        self.emit(PlayheadChangedEvent(seconds));
    }

    fn drag_began(&mut self) {
        self.emit(DragBeganEvent);
    }

    fn drag_ended(&mut self) {
        self.emit(DragEndedEvent);
    }
}
