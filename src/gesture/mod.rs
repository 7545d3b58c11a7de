//! Gesture interpretation: pure geometry over the current frame.
//!
//! Nothing in here can fail. A missing hand, a gesture not held, or an
//! entity out of reach all come back as "condition not met".

pub mod config;
pub mod geometry;
pub mod hold;
pub mod pinch;
pub mod smoothing;
pub mod timer;

pub use config::GestureConfig;
pub use geometry::{collides, distance, CanvasSize, Point};
pub use hold::{HoldGate, HoldProgress};
pub use pinch::{is_pinching, pinch_distance, EdgeTrigger};
pub use smoothing::Smoother;
pub use timer::PollTimer;
