pub mod models;
pub mod source;

pub use models::{index, FrameSnapshot, HandSnapshot, Handedness, Landmark, LANDMARK_COUNT};
pub use source::{LandmarkSource, SharedFrame};
