//! "Which Hand?" quiz: left/right differentiation with a hold gate.
//!
//! Each round: a 3-step countdown, a prompt naming the target hand, then
//! the target must stay visible for the full hold duration (polled every
//! `hold_poll_ms`; any miss restarts the hold). A short celebration follows
//! before the next round. After `max_rounds` rounds the activity completes.

use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    activity::{Activity, ActivityKind, RenderFrame, StartContext, TickContext, TickOutcome},
    gesture::{GestureConfig, HoldGate, HoldProgress, PollTimer},
    landmarks::Handedness,
    progress::{HandUsage, SessionExtras},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const DEFAULT_MAX_ROUNDS: u32 = 10;
pub const WHICH_HAND_FPS: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetOrder {
    /// Fair coin per round.
    #[default]
    Random,
    /// Equal left/right rounds in shuffled order.
    Balanced,
}

/// Observable phase, for presenters and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhichHandPhase {
    Idle,
    Countdown { remaining: u32 },
    Prompting { target: Handedness },
    Holding { target: Handedness, remaining_ms: u64 },
    Correct { target: Handedness },
    Complete,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Countdown { remaining: u32, next_step_ms: u64 },
    Awaiting { target: Handedness },
    Correct { target: Handedness, resume_at_ms: u64 },
    Complete,
}

pub struct WhichHand {
    config: GestureConfig,
    max_rounds: u32,
    order: TargetOrder,
    round: u32,
    hand_usage: HandUsage,
    phase: Phase,
    gate: HoldGate,
    poll: PollTimer,
    hold_remaining_ms: Option<u64>,
    queued_targets: Vec<Handedness>,
}

impl WhichHand {
    pub fn new(config: GestureConfig, max_rounds: u32, order: TargetOrder) -> Result<Self> {
        config.validate()?;
        if max_rounds == 0 {
            bail!("which-hand needs at least one round");
        }
        if config.countdown_steps == 0 {
            bail!("which-hand countdown needs at least one step");
        }

        Ok(Self {
            gate: HoldGate::new(config.hold_duration_ms),
            poll: PollTimer::new(config.hold_poll_ms),
            config,
            max_rounds,
            order,
            round: 1,
            hand_usage: HandUsage::default(),
            phase: Phase::Idle,
            hold_remaining_ms: None,
            queued_targets: Vec::new(),
        })
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn hand_usage(&self) -> HandUsage {
        self.hand_usage
    }

    pub fn phase(&self) -> WhichHandPhase {
        match self.phase {
            Phase::Idle => WhichHandPhase::Idle,
            Phase::Countdown { remaining, .. } => WhichHandPhase::Countdown { remaining },
            Phase::Awaiting { target } => match self.hold_remaining_ms {
                Some(remaining_ms) if self.gate.is_holding() => WhichHandPhase::Holding {
                    target,
                    remaining_ms,
                },
                _ => WhichHandPhase::Prompting { target },
            },
            Phase::Correct { target, .. } => WhichHandPhase::Correct { target },
            Phase::Complete => WhichHandPhase::Complete,
        }
    }

    fn queue_targets(&mut self, rng: &mut StdRng) {
        self.queued_targets.clear();
        if self.order != TargetOrder::Balanced {
            return;
        }
        let half = (self.max_rounds / 2) as usize;
        self.queued_targets.extend(std::iter::repeat(Handedness::Left).take(half));
        self.queued_targets.extend(std::iter::repeat(Handedness::Right).take(half));
        if self.max_rounds % 2 == 1 {
            self.queued_targets.push(random_hand(rng));
        }
        self.queued_targets.shuffle(rng);
    }

    fn next_round(&mut self, now_ms: u64) -> TickOutcome {
        if self.round > self.max_rounds {
            self.phase = Phase::Complete;
            return TickOutcome::Complete;
        }
        self.phase = Phase::Countdown {
            remaining: self.config.countdown_steps,
            next_step_ms: now_ms + self.config.countdown_step_ms,
        };
        TickOutcome::Continue
    }

    fn show_prompt(&mut self, now_ms: u64, rng: &mut StdRng) {
        let target = self
            .queued_targets
            .pop()
            .unwrap_or_else(|| random_hand(rng));
        self.gate.reset();
        self.hold_remaining_ms = None;
        self.poll.start(now_ms);
        self.phase = Phase::Awaiting { target };
        log_debug!("which-hand round {} wants {}", self.round, target.as_str());
    }

    fn correct_response(&mut self, target: Handedness, now_ms: u64, ctx: &mut TickContext<'_>) {
        self.poll.cancel();
        self.hold_remaining_ms = None;
        ctx.score.add(1);
        self.hand_usage.record(target);
        log_info!(
            "which-hand round {} correct ({}), score {}",
            self.round,
            target.as_str(),
            ctx.score.value()
        );
        self.round += 1;
        self.phase = Phase::Correct {
            target,
            resume_at_ms: now_ms + self.config.celebration_ms,
        };
    }
}

fn random_hand(rng: &mut StdRng) -> Handedness {
    if rng.gen_bool(0.5) {
        Handedness::Right
    } else {
        Handedness::Left
    }
}

impl Activity for WhichHand {
    fn kind(&self) -> ActivityKind {
        ActivityKind::WhichHand
    }

    fn fps(&self) -> u32 {
        WHICH_HAND_FPS
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) {
        self.round = 1;
        self.hand_usage = HandUsage::default();
        self.gate.reset();
        self.poll.cancel();
        self.hold_remaining_ms = None;
        self.queue_targets(ctx.rng);
        self.next_round(0);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome> {
        let now_ms = ctx.now_ms;
        match self.phase {
            Phase::Idle => Ok(TickOutcome::Continue),
            Phase::Countdown {
                remaining,
                next_step_ms,
            } => {
                if now_ms < next_step_ms {
                    return Ok(TickOutcome::Continue);
                }
                let remaining = remaining - 1;
                if remaining > 0 {
                    self.phase = Phase::Countdown {
                        remaining,
                        next_step_ms: next_step_ms + self.config.countdown_step_ms,
                    };
                } else {
                    self.show_prompt(now_ms, ctx.rng);
                }
                Ok(TickOutcome::Continue)
            }
            Phase::Awaiting { target } => {
                if !self.poll.poll(now_ms) {
                    return Ok(TickOutcome::Continue);
                }
                let present = ctx.hands.find(target).is_some();
                match self.gate.observe(present, now_ms) {
                    HoldProgress::Complete => self.correct_response(target, now_ms, ctx),
                    HoldProgress::Holding { remaining_ms, .. } => {
                        self.hold_remaining_ms = Some(remaining_ms);
                    }
                    HoldProgress::Absent | HoldProgress::Latched => {
                        self.hold_remaining_ms = None;
                    }
                }
                Ok(TickOutcome::Continue)
            }
            Phase::Correct { resume_at_ms, .. } => {
                if now_ms >= resume_at_ms {
                    return Ok(self.next_round(now_ms));
                }
                Ok(TickOutcome::Continue)
            }
            Phase::Complete => Ok(TickOutcome::Complete),
        }
    }

    fn render(&self, frame: &mut RenderFrame) {
        let (prompt, subtext) = match self.phase() {
            WhichHandPhase::Idle => return,
            WhichHandPhase::Countdown { remaining } if remaining == self.config.countdown_steps => (
                "Get Ready!".to_string(),
                format!("Starting in {remaining} seconds..."),
            ),
            WhichHandPhase::Countdown { remaining } => {
                ("Get Ready!".to_string(), format!("Starting in {remaining}..."))
            }
            WhichHandPhase::Prompting { target } => (
                format!("Show me your {} hand!", target.as_str()),
                format!(
                    "Hold it up for {} seconds...",
                    self.config.hold_duration_ms / 1000
                ),
            ),
            WhichHandPhase::Holding {
                target,
                remaining_ms,
            } => (
                format!("Show me your {} hand!", target.as_str()),
                format!("Great! Keep holding... {}", remaining_ms.div_ceil(1000)),
            ),
            WhichHandPhase::Correct { target } => (
                "Excellent!".to_string(),
                format!("That's your {} hand!", target.as_str()),
            ),
            WhichHandPhase::Complete => (
                "Activity Complete!".to_string(),
                format!("You scored {} out of {}!", frame.score, self.max_rounds),
            ),
        };
        frame.prompt = Some(prompt);
        frame.subtext = Some(subtext);
    }

    fn stop(&mut self) {
        self.poll.cancel();
        self.gate.reset();
    }

    fn session_extras(&self) -> Option<SessionExtras> {
        Some(SessionExtras {
            max_score: Some(self.max_rounds),
            hand_usage: Some(self.hand_usage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        activity::testing::Harness,
        landmarks::{models::fixtures::hand_at, FrameSnapshot},
    };

    const TICK_MS: u64 = 50;

    fn both_hands() -> FrameSnapshot {
        FrameSnapshot::new(vec![
            hand_at(Handedness::Left, 0.3, 0.5),
            hand_at(Handedness::Right, 0.7, 0.5),
        ])
    }

    fn harness(order: TargetOrder) -> Harness<WhichHand> {
        let activity = WhichHand::new(GestureConfig::default(), DEFAULT_MAX_ROUNDS, order).unwrap();
        let mut harness = Harness::new(activity, 7);
        harness.start();
        harness
    }

    fn run_until_prompt(harness: &mut Harness<WhichHand>) -> Handedness {
        for _ in 0..200 {
            harness.tick(TICK_MS, &FrameSnapshot::empty());
            if let WhichHandPhase::Prompting { target } = harness.activity.phase() {
                return target;
            }
        }
        panic!("no prompt within 10s");
    }

    #[test]
    fn rejects_zero_rounds() {
        assert!(WhichHand::new(GestureConfig::default(), 0, TargetOrder::Random).is_err());
    }

    #[test]
    fn countdown_steps_once_per_second() {
        let mut harness = harness(TargetOrder::Random);
        assert_eq!(harness.activity.phase(), WhichHandPhase::Countdown { remaining: 3 });
        assert_eq!(harness.frame().prompt.as_deref(), Some("Get Ready!"));

        harness.tick(999, &FrameSnapshot::empty());
        assert_eq!(harness.activity.phase(), WhichHandPhase::Countdown { remaining: 3 });
        harness.tick(1, &FrameSnapshot::empty());
        assert_eq!(harness.activity.phase(), WhichHandPhase::Countdown { remaining: 2 });
        assert_eq!(harness.frame().subtext.as_deref(), Some("Starting in 2..."));
        harness.tick(1000, &FrameSnapshot::empty());
        harness.tick(1000, &FrameSnapshot::empty());
        assert!(matches!(harness.activity.phase(), WhichHandPhase::Prompting { .. }));
    }

    #[test]
    fn hold_gate_requires_uninterrupted_presence() {
        let mut harness = harness(TargetOrder::Random);
        let target = run_until_prompt(&mut harness);
        let present = FrameSnapshot::new(vec![hand_at(target, 0.5, 0.5)]);
        let wrong = FrameSnapshot::new(vec![hand_at(target.opposite(), 0.5, 0.5)]);

        // 1.9s of holding, then one poll with only the wrong hand.
        for _ in 0..38 {
            harness.tick(TICK_MS, &present);
        }
        assert!(matches!(harness.activity.phase(), WhichHandPhase::Holding { .. }));
        harness.tick(TICK_MS, &wrong);
        harness.tick(TICK_MS, &wrong);
        assert_eq!(harness.activity.phase(), WhichHandPhase::Prompting { target });
        assert_eq!(harness.score.value(), 0);

        // A fresh window needs the full duration again.
        for _ in 0..40 {
            harness.tick(TICK_MS, &present);
        }
        assert_eq!(harness.score.value(), 0);
        for _ in 0..4 {
            harness.tick(TICK_MS, &present);
        }
        assert_eq!(harness.score.value(), 1);
        assert_eq!(harness.activity.phase(), WhichHandPhase::Correct { target });
        assert_eq!(harness.activity.round(), 2);
    }

    #[test]
    fn holding_text_counts_down() {
        let mut harness = harness(TargetOrder::Random);
        let target = run_until_prompt(&mut harness);
        let present = FrameSnapshot::new(vec![hand_at(target, 0.5, 0.5)]);
        for _ in 0..6 {
            harness.tick(TICK_MS, &present);
        }
        assert_eq!(
            harness.frame().subtext.as_deref(),
            Some("Great! Keep holding... 2")
        );
    }

    #[test]
    fn ten_correct_rounds_complete_the_activity() {
        let mut harness = harness(TargetOrder::Random);
        let hands = both_hands();
        let mut outcome = TickOutcome::Continue;
        for _ in 0..(120_000 / TICK_MS) {
            outcome = harness.tick(TICK_MS, &hands);
            if outcome == TickOutcome::Complete {
                break;
            }
        }

        assert_eq!(outcome, TickOutcome::Complete);
        assert_eq!(harness.score.value(), 10);
        assert_eq!(harness.activity.round(), 11);
        assert_eq!(harness.activity.hand_usage().total(), 10);
        let frame = harness.frame();
        assert_eq!(frame.prompt.as_deref(), Some("Activity Complete!"));
        assert_eq!(frame.subtext.as_deref(), Some("You scored 10 out of 10!"));

        let extras = harness.activity.session_extras().unwrap();
        assert_eq!(extras.max_score, Some(10));
        assert_eq!(extras.hand_usage.unwrap().total(), 10);
    }

    #[test]
    fn balanced_order_splits_targets_evenly() {
        let mut harness = harness(TargetOrder::Balanced);
        let hands = both_hands();
        while harness.tick(TICK_MS, &hands) != TickOutcome::Complete {}
        assert_eq!(harness.activity.hand_usage(), HandUsage { left: 5, right: 5 });
    }

    #[test]
    fn wrong_hand_never_scores() {
        let mut harness = harness(TargetOrder::Random);
        let target = run_until_prompt(&mut harness);
        let wrong = FrameSnapshot::new(vec![hand_at(target.opposite(), 0.5, 0.5)]);
        for _ in 0..200 {
            harness.tick(TICK_MS, &wrong);
        }
        assert_eq!(harness.score.value(), 0);
        assert_eq!(harness.activity.phase(), WhichHandPhase::Prompting { target });
    }
}
