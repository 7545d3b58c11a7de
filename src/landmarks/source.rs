use std::sync::{Arc, RwLock};

use super::FrameSnapshot;

/// Pull-model access to the detector's latest frame.
///
/// Implementations hand out a snapshot; callers never keep references into
/// the detector's own buffers.
pub trait LandmarkSource: Send + Sync {
    fn detected_hands(&self) -> FrameSnapshot;
}

/// Latest-frame slot shared between the detector callback and activities.
///
/// The detector side calls [`SharedFrame::publish`] on every result; the
/// activity side reads through [`LandmarkSource`].
#[derive(Clone, Default)]
pub struct SharedFrame {
    latest: Arc<RwLock<FrameSnapshot>>,
}

impl SharedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: FrameSnapshot) {
        let mut guard = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = frame;
    }

    pub fn clear(&self) {
        self.publish(FrameSnapshot::empty());
    }
}

impl LandmarkSource for SharedFrame {
    fn detected_hands(&self) -> FrameSnapshot {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
