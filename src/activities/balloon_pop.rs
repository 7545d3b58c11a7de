//! Pinch to pop the rising balloons.

use std::f32::consts::TAU;

use anyhow::Result;
use rand::{rngs::StdRng, Rng};

use crate::{
    activity::{
        Activity, ActivityKind, RenderFrame, Sprite, SpriteKind, StartContext, TickContext,
        TickOutcome,
    },
    gesture::{distance, is_pinching, CanvasSize, EdgeTrigger, GestureConfig, Point},
};

use super::uniform;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const MAX_BALLOONS: usize = 5;
pub const SPAWN_CHANCE: f64 = 0.05;
/// Added to the balloon radius when testing the pointer against it.
pub const POP_MARGIN: f32 = 20.0;
pub const PALETTE_SIZE: u8 = 5;
const MIN_RADIUS: f32 = 40.0;
const MAX_RADIUS: f32 = 60.0;
const MIN_SPEED: f32 = 1.5;
const MAX_SPEED: f32 = 4.0;
const WOBBLE_AMPLITUDE: f32 = 8.0;
const POINTER_RADIUS: f32 = 25.0;
const BURST_PARTICLES: usize = 8;
const PARTICLE_GRAVITY: f32 = 0.2;
const PARTICLE_FADE: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Balloon {
    center: Point,
    radius: f32,
    /// Pixels per tick, upwards.
    speed: f32,
    color: u8,
    wobble: f32,
    wobble_speed: f32,
}

#[derive(Debug, Clone, Copy)]
struct Particle {
    position: Point,
    velocity: Point,
    alpha: f32,
}

pub struct BalloonPop {
    config: GestureConfig,
    balloons: Vec<Balloon>,
    particles: Vec<Particle>,
    pinch: EdgeTrigger,
    pointer: Option<Point>,
    popped: u32,
}

impl BalloonPop {
    pub fn new(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            balloons: Vec::new(),
            particles: Vec::new(),
            pinch: EdgeTrigger::new(),
            pointer: None,
            popped: 0,
        })
    }

    pub fn balloon_count(&self) -> usize {
        self.balloons.len()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn popped(&self) -> u32 {
        self.popped
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_high()
    }

    fn spawn_balloon(&mut self, canvas: CanvasSize, rng: &mut StdRng) {
        let radius = uniform(rng, MIN_RADIUS, MAX_RADIUS);
        self.balloons.push(Balloon {
            center: Point::new(
                radius + rng.gen::<f32>() * (canvas.width - radius * 2.0).max(0.0),
                canvas.height + radius,
            ),
            radius,
            speed: uniform(rng, MIN_SPEED, MAX_SPEED),
            color: rng.gen_range(0..PALETTE_SIZE),
            wobble: rng.gen::<f32>() * TAU,
            wobble_speed: uniform(rng, 0.03, 0.08),
        });
    }

    /// Nearest balloon within reach of the pointer. Later balloons are drawn
    /// on top, so they win ties.
    fn pop_target(&self, pointer: Point) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, balloon) in self.balloons.iter().enumerate().rev() {
            let dist = distance(pointer, balloon.center);
            if dist >= balloon.radius + POP_MARGIN {
                continue;
            }
            if best.map_or(true, |(_, nearest)| dist < nearest) {
                best = Some((idx, dist));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn burst(&mut self, center: Point, rng: &mut StdRng) {
        for _ in 0..BURST_PARTICLES {
            let angle = rng.gen::<f32>() * TAU;
            let speed = uniform(rng, 2.0, 6.0);
            self.particles.push(Particle {
                position: center,
                velocity: Point::new(angle.cos() * speed, angle.sin() * speed),
                alpha: 1.0,
            });
        }
    }
}

impl Activity for BalloonPop {
    fn kind(&self) -> ActivityKind {
        ActivityKind::BalloonPop
    }

    fn start(&mut self, _ctx: &mut StartContext<'_>) {
        self.balloons.clear();
        self.particles.clear();
        self.pinch.reset();
        self.pointer = None;
        self.popped = 0;
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome> {
        for balloon in &mut self.balloons {
            balloon.center.y -= balloon.speed;
            balloon.wobble += balloon.wobble_speed;
        }
        self.balloons
            .retain(|balloon| balloon.center.y + balloon.radius > 0.0);

        for particle in &mut self.particles {
            particle.position.x += particle.velocity.x;
            particle.position.y += particle.velocity.y;
            particle.velocity.y += PARTICLE_GRAVITY;
            particle.alpha -= PARTICLE_FADE;
        }
        self.particles.retain(|particle| particle.alpha > 0.0);

        if self.balloons.len() < MAX_BALLOONS && ctx.rng.gen_bool(SPAWN_CHANCE) {
            self.spawn_balloon(ctx.canvas, ctx.rng);
        }

        let pinching = match ctx.hands.primary() {
            Some(hand) => {
                self.pointer = Some(ctx.canvas.project(&hand.index_tip()));
                is_pinching(hand, self.config.pinch_threshold)
            }
            None => {
                self.pointer = None;
                false
            }
        };

        if self.pinch.update(pinching) {
            let target = self.pointer.and_then(|pointer| self.pop_target(pointer));
            if let Some(idx) = target {
                let balloon = self.balloons.remove(idx);
                self.burst(balloon.center, ctx.rng);
                self.popped += 1;
                ctx.score.add(1);
                log_debug!("popped balloon at {:?}, score {}", balloon.center, ctx.score.value());
            }
        }
        Ok(TickOutcome::Continue)
    }

    fn render(&self, frame: &mut RenderFrame) {
        for balloon in &self.balloons {
            let center = Point::new(
                balloon.center.x + balloon.wobble.sin() * WOBBLE_AMPLITUDE,
                balloon.center.y,
            );
            frame.push(Sprite::new(
                SpriteKind::Balloon {
                    color: balloon.color,
                },
                center,
                balloon.radius,
            ));
        }
        for particle in &self.particles {
            frame.push(Sprite::new(
                SpriteKind::Particle {
                    alpha: particle.alpha,
                },
                particle.position,
                3.0,
            ));
        }
        if let Some(pointer) = self.pointer {
            frame.push(Sprite::new(
                SpriteKind::Pointer {
                    pinching: self.pinch.is_high(),
                },
                pointer,
                POINTER_RADIUS,
            ));
        }
    }

    fn stop(&mut self) {
        self.pinch.reset();
    }
}
