//! Free-play visualization: shows tracked fingertips and reports which
//! hands are in view every half second. Records no sessions.

use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::{
    activity::{
        Activity, ActivityKind, RenderFrame, Sprite, SpriteKind, StartContext, TickContext,
        TickOutcome,
    },
    gesture::{is_pinching, GestureConfig, Point, PollTimer},
    landmarks::{FrameSnapshot, Handedness},
    progress::SessionExtras,
};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Display cadence; the report itself runs on its own slower timer.
pub const HAND_TRACKER_FPS: u32 = 10;
const POINTER_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "hands")]
pub enum HandReport {
    NoHands,
    One { hand: Handedness },
    Both { first: Handedness, second: Handedness },
}

impl HandReport {
    /// Only the first two detected hands are reported.
    pub fn from_frame(frame: &FrameSnapshot) -> Self {
        match frame.hands() {
            [] => HandReport::NoHands,
            [only] => HandReport::One {
                hand: only.handedness(),
            },
            [first, second, ..] => HandReport::Both {
                first: first.handedness(),
                second: second.handedness(),
            },
        }
    }
}

impl fmt::Display for HandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandReport::NoHands => f.write_str("No hands detected. Try waving your hands!"),
            HandReport::One { hand } => write!(f, "{} hand detected!", hand.as_str()),
            HandReport::Both { first, second } => write!(
                f,
                "Both hands detected! {} & {}",
                first.as_str(),
                second.as_str()
            ),
        }
    }
}

pub struct HandTracker {
    config: GestureConfig,
    report_timer: PollTimer,
    report: Option<HandReport>,
    pointers: Vec<(Point, bool)>,
}

impl HandTracker {
    pub fn new(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            report_timer: PollTimer::new(config.tracker_report_ms),
            config,
            report: None,
            pointers: Vec::new(),
        })
    }

    /// Latest periodic report; `None` until the first one is due.
    pub fn report(&self) -> Option<HandReport> {
        self.report
    }
}

impl Activity for HandTracker {
    fn kind(&self) -> ActivityKind {
        ActivityKind::HandTracker
    }

    fn fps(&self) -> u32 {
        HAND_TRACKER_FPS
    }

    fn start(&mut self, _ctx: &mut StartContext<'_>) {
        self.report = None;
        self.pointers.clear();
        self.report_timer.start(0);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome> {
        self.pointers = ctx
            .hands
            .hands()
            .iter()
            .map(|hand| {
                (
                    ctx.canvas.project(&hand.index_tip()),
                    is_pinching(hand, self.config.pinch_threshold),
                )
            })
            .collect();

        if self.report_timer.poll(ctx.now_ms) {
            let report = HandReport::from_frame(ctx.hands);
            if self.report != Some(report) {
                log_debug!("hand tracker: {report}");
            }
            self.report = Some(report);
        }
        Ok(TickOutcome::Continue)
    }

    fn render(&self, frame: &mut RenderFrame) {
        for (center, pinching) in &self.pointers {
            frame.push(Sprite::new(
                SpriteKind::Pointer {
                    pinching: *pinching,
                },
                *center,
                POINTER_RADIUS,
            ));
        }
        frame.prompt = Some("Hand Tracker".to_string());
        frame.subtext = Some(
            self.report
                .map(|report| report.to_string())
                .unwrap_or_else(|| "Looking for hands...".to_string()),
        );
    }

    fn stop(&mut self) {
        self.report_timer.cancel();
    }

    fn session_extras(&self) -> Option<SessionExtras> {
        None
    }
}
