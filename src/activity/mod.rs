//! Activity lifecycle shared by every gesture game.
//!
//! A variant implements [`Activity`]; an [`ActivityRunner`] owns the cadence
//! task, the session state, and the single session-summary write on stop.

pub mod presenter;
pub mod runner;
pub mod state;

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    gesture::CanvasSize,
    landmarks::FrameSnapshot,
    progress::SessionExtras,
};

pub use presenter::{NullPresenter, Presenter, RenderFrame, Sprite, SpriteKind};
pub use runner::{ActivityRunner, StopReport};
pub use state::{ActivityState, ActivityStatus, Score};

/// Default cadence for gesture games.
pub const DEFAULT_FPS: u32 = 30;

/// Upper bound on any cadence; keeps the tick period well above zero.
pub const MAX_FPS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    WhichHand,
    HandTracker,
    CatchStars,
    BalloonPop,
    DuckCatch,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::WhichHand,
        ActivityKind::HandTracker,
        ActivityKind::CatchStars,
        ActivityKind::BalloonPop,
        ActivityKind::DuckCatch,
    ];

    /// Key used in the progress document.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::WhichHand => "whichHand",
            ActivityKind::HandTracker => "handTracker",
            ActivityKind::CatchStars => "catchStars",
            ActivityKind::BalloonPop => "balloonPop",
            ActivityKind::DuckCatch => "duckCatch",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = anyhow::Error;

    /// Accepts the progress key (`catchStars`) or kebab-case (`catch-stars`).
    fn from_str(value: &str) -> Result<Self> {
        ActivityKind::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str() == value
                    || kind.as_str().to_ascii_lowercase() == value.replace('-', "")
            })
            .ok_or_else(|| anyhow!("unknown activity '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The variant reached its own end condition; the runner stops it.
    Complete,
}

/// Inputs for one cadence tick.
pub struct TickContext<'a> {
    /// Milliseconds since the session started.
    pub now_ms: u64,
    pub hands: &'a FrameSnapshot,
    pub canvas: CanvasSize,
    pub score: &'a mut Score,
    pub rng: &'a mut StdRng,
}

pub struct StartContext<'a> {
    pub canvas: CanvasSize,
    pub rng: &'a mut StdRng,
}

/// A gesture game driven by the shared cadence.
///
/// Within one `update`, implementations move entities before resolving
/// collisions and mutate the score last; the runner redraws afterwards.
pub trait Activity: Send + 'static {
    fn kind(&self) -> ActivityKind;

    /// Cadence in frames per second.
    fn fps(&self) -> u32 {
        DEFAULT_FPS
    }

    /// Resets variant state for a new session at `now_ms == 0`.
    fn start(&mut self, ctx: &mut StartContext<'_>);

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome>;

    /// Fills in the variant's sprites and HUD text.
    fn render(&self, frame: &mut RenderFrame);

    /// Cancels the variant's own timers. Called once per session.
    fn stop(&mut self) {}

    /// Extra fields for the session record, or `None` when the variant
    /// does not record sessions.
    fn session_extras(&self) -> Option<SessionExtras> {
        Some(SessionExtras::default())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_activity_names() {
        assert_eq!("catchStars".parse::<ActivityKind>().unwrap(), ActivityKind::CatchStars);
        assert_eq!("duck-catch".parse::<ActivityKind>().unwrap(), ActivityKind::DuckCatch);
        assert_eq!("which-hand".parse::<ActivityKind>().unwrap(), ActivityKind::WhichHand);
        assert!("memory-match".parse::<ActivityKind>().is_err());
    }

    #[test]
    fn serializes_as_progress_key() {
        assert_eq!(
            serde_json::to_value(ActivityKind::BalloonPop).unwrap(),
            serde_json::json!("balloonPop")
        );
    }
}
