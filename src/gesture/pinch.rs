use crate::landmarks::HandSnapshot;

/// Thumb-tip to index-tip distance in normalized units.
pub fn pinch_distance(hand: &HandSnapshot) -> f32 {
    hand.thumb_tip().distance_to(&hand.index_tip())
}

pub fn is_pinching(hand: &HandSnapshot, threshold: f32) -> bool {
    pinch_distance(hand) < threshold
}

/// Fires on false→true transitions only.
///
/// The previous level is the only state; a single false sample re-arms it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    level: bool,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current level, returns `true` on a rising edge.
    pub fn update(&mut self, level: bool) -> bool {
        let rising = level && !self.level;
        self.level = level;
        rising
    }

    pub fn is_high(&self) -> bool {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = false;
    }
}
