//! Core engine modules - model, solver, gestures, events, workers
//!
//! These modules form the interaction engine, independent of any UI.

pub mod constraints;
pub mod event_bus;
pub mod gesture;
pub mod range_model;
pub mod slider_events;
pub mod workers;

// Re-exports for convenience
pub use constraints::ConstraintSolver;
pub use event_bus::EventBus;
pub use gesture::GestureController;
pub use range_model::RangeModel;
pub use workers::Workers;
