//! Hand landmark data as delivered by the external detector.
//!
//! Points are normalized to the camera frame: `x` and `y` in `[0, 1]`,
//! `z` relative depth (optional, zero when the detector omits it).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;

/// Anatomical landmark numbering fixed by the detector model.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_TIP: usize = 20;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar distance in normalized units; `z` is ignored.
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }

    /// Exact, case-sensitive match on the detector's label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Left" => Some(Handedness::Left),
            "Right" => Some(Handedness::Right),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

/// One detected hand in one frame. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSnapshot {
    landmarks: [Landmark; LANDMARK_COUNT],
    handedness: Handedness,
}

impl HandSnapshot {
    pub fn new(landmarks: Vec<Landmark>, handedness: Handedness) -> Result<Self> {
        let count = landmarks.len();
        let landmarks: [Landmark; LANDMARK_COUNT] = match landmarks.try_into() {
            Ok(points) => points,
            Err(_) => bail!("expected {LANDMARK_COUNT} landmarks per hand, got {count}"),
        };
        Ok(Self {
            landmarks,
            handedness,
        })
    }

    pub fn from_points(landmarks: [Landmark; LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn landmark(&self, idx: usize) -> Option<&Landmark> {
        self.landmarks.get(idx)
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Landmark {
        self.landmarks[index::WRIST]
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.landmarks[index::THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.landmarks[index::INDEX_FINGER_TIP]
    }
}

/// Hands visible in the current frame. Replaced wholesale every frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSnapshot {
    hands: Vec<HandSnapshot>,
}

impl FrameSnapshot {
    pub fn new(hands: Vec<HandSnapshot>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hands(&self) -> &[HandSnapshot] {
        &self.hands
    }

    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// The hand the detector listed first; activities that track a single
    /// pointer follow this one.
    pub fn primary(&self) -> Option<&HandSnapshot> {
        self.hands.first()
    }

    pub fn find(&self, handedness: Handedness) -> Option<&HandSnapshot> {
        self.hands.iter().find(|hand| hand.handedness == handedness)
    }
}
