//! Catch the falling stars with either wrist.

use anyhow::Result;
use rand::{rngs::StdRng, Rng};

use crate::{
    activity::{
        Activity, ActivityKind, RenderFrame, Sprite, SpriteKind, StartContext, TickContext,
        TickOutcome,
    },
    gesture::{collides, CanvasSize, Point, PollTimer},
};

use super::uniform;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const STAR_RADIUS: f32 = 20.0;
/// Added to the star radius when testing a wrist against it.
pub const CATCH_MARGIN: f32 = 30.0;
pub const SPAWN_INTERVAL_MS: u64 = 2000;
const MIN_SPEED: f32 = 2.0;
const MAX_SPEED: f32 = 4.0;
const FLASH_RADIUS: f32 = 40.0;
const FLASH_MS: u64 = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    center: Point,
    radius: f32,
    /// Pixels per tick.
    speed: f32,
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    center: Point,
    until_ms: u64,
}

pub struct CatchStars {
    stars: Vec<Star>,
    flashes: Vec<Flash>,
    spawn_timer: PollTimer,
    caught: u32,
    missed: u32,
}

impl Default for CatchStars {
    fn default() -> Self {
        Self::new()
    }
}

impl CatchStars {
    pub fn new() -> Self {
        Self {
            stars: Vec::new(),
            flashes: Vec::new(),
            spawn_timer: PollTimer::new(SPAWN_INTERVAL_MS),
            caught: 0,
            missed: 0,
        }
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    pub fn caught(&self) -> u32 {
        self.caught
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    pub fn spawn_timer_armed(&self) -> bool {
        self.spawn_timer.is_armed()
    }

    fn spawn_star(&mut self, canvas: CanvasSize, rng: &mut StdRng) {
        self.stars.push(Star {
            center: Point::new(rng.gen::<f32>() * canvas.width, 0.0),
            radius: STAR_RADIUS,
            speed: uniform(rng, MIN_SPEED, MAX_SPEED),
        });
    }
}

impl Activity for CatchStars {
    fn kind(&self) -> ActivityKind {
        ActivityKind::CatchStars
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) {
        self.stars.clear();
        self.flashes.clear();
        self.caught = 0;
        self.missed = 0;
        self.spawn_star(ctx.canvas, ctx.rng);
        self.spawn_timer.start(0);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome> {
        if self.spawn_timer.poll(ctx.now_ms) {
            self.spawn_star(ctx.canvas, ctx.rng);
        }

        for star in &mut self.stars {
            star.center.y += star.speed;
        }

        let wrists: Vec<Point> = ctx
            .hands
            .hands()
            .iter()
            .map(|hand| ctx.canvas.project(&hand.wrist()))
            .collect();

        // A star is caught at most once however many wrists touch it.
        let height = ctx.canvas.height;
        let now_ms = ctx.now_ms;
        let mut caught = 0;
        let mut missed = 0;
        let flashes = &mut self.flashes;
        self.stars.retain(|star| {
            let hit = wrists
                .iter()
                .any(|wrist| collides(*wrist, star.center, star.radius, CATCH_MARGIN));
            if hit {
                caught += 1;
                flashes.push(Flash {
                    center: star.center,
                    until_ms: now_ms + FLASH_MS,
                });
                return false;
            }
            if star.center.y >= height {
                missed += 1;
                return false;
            }
            true
        });
        self.flashes.retain(|flash| flash.until_ms > now_ms);

        if caught > 0 {
            self.caught += caught;
            ctx.score.add(caught);
            log_debug!("caught {} star(s), score {}", caught, ctx.score.value());
        }
        self.missed += missed;
        Ok(TickOutcome::Continue)
    }

    fn render(&self, frame: &mut RenderFrame) {
        for star in &self.stars {
            frame.push(Sprite::new(SpriteKind::Star, star.center, star.radius));
        }
        for flash in &self.flashes {
            frame.push(Sprite::new(SpriteKind::CatchFlash, flash.center, FLASH_RADIUS));
        }
    }

    fn stop(&mut self) {
        self.spawn_timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        activity::testing::Harness,
        landmarks::{models::fixtures::hand_at, FrameSnapshot, Handedness},
    };

    fn harness() -> Harness<CatchStars> {
        let mut harness = Harness::new(CatchStars::new(), 11);
        harness.start();
        harness
    }

    fn parked_star(x: f32, y: f32) -> Star {
        Star {
            center: Point::new(x, y),
            radius: STAR_RADIUS,
            speed: 0.0,
        }
    }

    fn wrist_at(px: f32, py: f32) -> FrameSnapshot {
        FrameSnapshot::new(vec![hand_at(Handedness::Right, px / 640.0, py / 480.0)])
    }

    #[test]
    fn spawns_on_start_and_every_interval() {
        let mut harness = harness();
        assert_eq!(harness.activity.star_count(), 1);
        harness.tick(1999, &FrameSnapshot::empty());
        assert_eq!(harness.activity.star_count(), 1);
        harness.tick(1, &FrameSnapshot::empty());
        assert_eq!(harness.activity.star_count(), 2);
    }

    #[test]
    fn wrist_within_margin_catches() {
        let mut harness = harness();
        harness.activity.stars = vec![parked_star(100.0, 100.0)];
        harness.tick(33, &wrist_at(115.0, 100.0));
        assert_eq!(harness.score.value(), 1);
        assert_eq!(harness.activity.star_count(), 0);
        assert_eq!(harness.frame().count(|kind| *kind == SpriteKind::CatchFlash), 1);
    }

    #[test]
    fn wrist_outside_margin_misses() {
        let mut harness = harness();
        harness.activity.stars = vec![parked_star(100.0, 100.0)];
        harness.tick(33, &wrist_at(200.0, 100.0));
        assert_eq!(harness.score.value(), 0);
        assert_eq!(harness.activity.star_count(), 1);
    }

    #[test]
    fn two_wrists_on_one_star_score_once() {
        let mut harness = harness();
        harness.activity.stars = vec![parked_star(100.0, 100.0)];
        let hands = FrameSnapshot::new(vec![
            hand_at(Handedness::Left, 100.0 / 640.0, 100.0 / 480.0),
            hand_at(Handedness::Right, 110.0 / 640.0, 100.0 / 480.0),
        ]);
        harness.tick(33, &hands);
        assert_eq!(harness.score.value(), 1);
    }

    #[test]
    fn stars_leaving_the_bottom_are_dropped() {
        let mut harness = harness();
        harness.activity.stars = vec![Star {
            center: Point::new(300.0, 478.0),
            radius: STAR_RADIUS,
            speed: 3.0,
        }];
        harness.tick(33, &FrameSnapshot::empty());
        assert_eq!(harness.activity.star_count(), 0);
        assert_eq!(harness.activity.missed(), 1);
        assert_eq!(harness.score.value(), 0);
    }

    #[test]
    fn falling_stars_move_down_each_tick() {
        let mut harness = harness();
        let before = harness.activity.stars[0];
        harness.tick(33, &FrameSnapshot::empty());
        let after = harness.activity.stars[0];
        assert!(after.center.y > before.center.y);
        assert!((MIN_SPEED..MAX_SPEED).contains(&after.speed));
    }

    #[test]
    fn stop_disarms_spawning() {
        let mut harness = harness();
        harness.activity.stop();
        assert!(!harness.activity.spawn_timer_armed());
        harness.tick(5000, &FrameSnapshot::empty());
        assert_eq!(harness.activity.star_count(), 1);
    }
}
