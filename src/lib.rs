//! TRIMRANGE - Trim slider interaction core
//!
//! Range handles, playhead and drag constraint solving for a media trim
//! control. Rendering, decoding and encoding stay with the host behind
//! the traits in [`media`].

// Core engine (model, solver, gestures, events, workers)
pub mod core;

// Control and collaborators
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod media;
pub mod paths;
pub mod script;
pub mod slider;
pub mod thumbnails;
pub mod utils;

// Re-export commonly used types from core
pub use core::constraints::{ConstraintSolver, SelectionConstraints};
pub use core::event_bus::{downcast_event, BoxedEvent, EventBus, EventEmitter};
pub use core::gesture::{DragTarget, GestureController, Resolved};
pub use core::range_model::RangeModel;
pub use core::slider_events::TrimObserver;

pub use config::TrimConfig;
pub use error::TrimError;
pub use slider::{SliderLayout, TrimSlider};
