//! The five gesture games.

pub mod balloon_pop;
pub mod catch_stars;
pub mod duck_catch;
pub mod hand_tracker;
pub mod which_hand;

use anyhow::Result;
use rand::{rngs::StdRng, Rng};

use crate::{
    activity::{Activity, ActivityKind, RenderFrame, StartContext, TickContext, TickOutcome},
    progress::SessionExtras,
    settings::EngineSettings,
};

pub use balloon_pop::BalloonPop;
pub use catch_stars::CatchStars;
pub use duck_catch::{DuckCatch, ItemKind};
pub use hand_tracker::{HandReport, HandTracker};
pub use which_hand::{TargetOrder, WhichHand, WhichHandPhase};

/// Uniform draw in `[lo, hi)`.
pub(crate) fn uniform(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    lo + rng.gen::<f32>() * (hi - lo)
}

enum Variant {
    WhichHand(WhichHand),
    HandTracker(HandTracker),
    CatchStars(CatchStars),
    BalloonPop(BalloonPop),
    DuckCatch(DuckCatch),
}

/// Any variant, chosen at runtime, with the configured cadence.
pub struct GestureActivity {
    variant: Variant,
    fps: u32,
}

macro_rules! dispatch {
    ($variant:expr, $inner:ident => $body:expr) => {
        match $variant {
            Variant::WhichHand($inner) => $body,
            Variant::HandTracker($inner) => $body,
            Variant::CatchStars($inner) => $body,
            Variant::BalloonPop($inner) => $body,
            Variant::DuckCatch($inner) => $body,
        }
    };
}

impl GestureActivity {
    pub fn from_settings(kind: ActivityKind, settings: &EngineSettings) -> Result<Self> {
        settings.validate()?;
        let gesture = settings.gesture.clone();
        let variant = match kind {
            ActivityKind::WhichHand => Variant::WhichHand(WhichHand::new(
                gesture,
                settings.which_hand.max_rounds,
                settings.which_hand.target_order,
            )?),
            ActivityKind::HandTracker => Variant::HandTracker(HandTracker::new(gesture)?),
            ActivityKind::CatchStars => Variant::CatchStars(CatchStars::new()),
            ActivityKind::BalloonPop => Variant::BalloonPop(BalloonPop::new(gesture)?),
            ActivityKind::DuckCatch => Variant::DuckCatch(DuckCatch::new(gesture)?),
        };
        Ok(Self {
            variant,
            fps: settings.cadence.fps(kind),
        })
    }
}

impl Activity for GestureActivity {
    fn kind(&self) -> ActivityKind {
        dispatch!(&self.variant, inner => inner.kind())
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) {
        dispatch!(&mut self.variant, inner => inner.start(ctx))
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome> {
        dispatch!(&mut self.variant, inner => inner.update(ctx))
    }

    fn render(&self, frame: &mut RenderFrame) {
        dispatch!(&self.variant, inner => inner.render(frame))
    }

    fn stop(&mut self) {
        dispatch!(&mut self.variant, inner => inner.stop())
    }

    fn session_extras(&self) -> Option<SessionExtras> {
        dispatch!(&self.variant, inner => inner.session_extras())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_kind_with_its_cadence() {
        let settings = EngineSettings::default();
        for kind in ActivityKind::ALL {
            let activity = GestureActivity::from_settings(kind, &settings).unwrap();
            assert_eq!(activity.kind(), kind);
            assert_eq!(activity.fps(), settings.cadence.fps(kind));
        }
    }

    #[test]
    fn only_the_tracker_skips_recording() {
        let settings = EngineSettings::default();
        for kind in ActivityKind::ALL {
            let activity = GestureActivity::from_settings(kind, &settings).unwrap();
            assert_eq!(
                activity.session_extras().is_none(),
                kind == ActivityKind::HandTracker
            );
        }
    }

    #[test]
    fn rejects_invalid_settings() {
        let mut settings = EngineSettings::default();
        settings.which_hand.max_rounds = 0;
        assert!(GestureActivity::from_settings(ActivityKind::WhichHand, &settings).is_err());
    }
}
