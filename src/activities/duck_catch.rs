//! Move the basket sideways to catch eggs dropped by the ducks; waste costs
//! a point.

use std::f32::consts::TAU;

use anyhow::Result;
use rand::{rngs::StdRng, Rng};
use serde::Serialize;

use crate::{
    activity::{
        Activity, ActivityKind, RenderFrame, Score, Sprite, SpriteKind, StartContext,
        TickContext, TickOutcome,
    },
    gesture::{CanvasSize, GestureConfig, Point, Smoother},
};

use super::uniform;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const DUCK_COUNT: usize = 6;
const DUCK_PADDING: f32 = 60.0;
const DUCK_Y: f32 = 80.0;
const DUCK_RADIUS: f32 = 25.0;
const DUCK_WOBBLE_STEP: f32 = 0.05;
const DUCK_WOBBLE_AMPLITUDE: f32 = 3.0;

pub const BASKET_WIDTH: f32 = 80.0;
pub const BASKET_HEIGHT: f32 = 40.0;
/// Basket centre sits this far above the bottom edge.
const BASKET_OFFSET: f32 = 60.0;
const CATCH_SLACK_X: f32 = 10.0;
const CATCH_BAND_ABOVE: f32 = 10.0;
const CATCH_BAND_BELOW: f32 = 20.0;

pub const MAX_ITEMS: usize = 3;
/// Draw above which an item is an egg.
const WASTE_CHANCE: f32 = 0.3;
pub const EGG_POINTS: u32 = 5;
pub const WASTE_PENALTY: u32 = 1;
const ITEM_RADIUS: f32 = 12.0;
const ITEM_DROP_OFFSET: f32 = 20.0;
const MIN_ITEM_SPEED: f32 = 3.0;
const MAX_ITEM_SPEED: f32 = 6.0;
const ESCAPE_MARGIN: f32 = 20.0;

const DROP_BASE_MS: u64 = 3000;
const DROP_JITTER_MS: f32 = 4000.0;
const FIRST_DROP_JITTER_MS: f32 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Egg,
    Waste,
}

impl ItemKind {
    fn apply(&self, score: &mut Score) {
        match self {
            ItemKind::Egg => score.add(EGG_POINTS),
            ItemKind::Waste => score.penalize(WASTE_PENALTY),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Duck {
    position: Point,
    wobble: f32,
    next_drop_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Item {
    kind: ItemKind,
    center: Point,
    speed: f32,
    rotation: f32,
    rotation_speed: f32,
}

pub struct DuckCatch {
    ducks: Vec<Duck>,
    items: Vec<Item>,
    basket: Smoother,
    target_x: f32,
    basket_y: f32,
    eggs_caught: u32,
    waste_caught: u32,
}

impl DuckCatch {
    pub fn new(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        let canvas = CanvasSize::default();
        Ok(Self {
            ducks: Vec::new(),
            items: Vec::new(),
            basket: Smoother::new(canvas.width / 2.0, config.smoothing_factor),
            target_x: canvas.width / 2.0,
            basket_y: canvas.height - BASKET_OFFSET,
            eggs_caught: 0,
            waste_caught: 0,
        })
    }

    pub fn basket_position(&self) -> Point {
        Point::new(self.basket.value(), self.basket_y)
    }

    pub fn duck_positions(&self) -> Vec<Point> {
        self.ducks.iter().map(|duck| duck.position).collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn eggs_caught(&self) -> u32 {
        self.eggs_caught
    }

    pub fn waste_caught(&self) -> u32 {
        self.waste_caught
    }

    fn next_drop(now_ms: u64, rng: &mut StdRng) -> u64 {
        now_ms + DROP_BASE_MS + (rng.gen::<f32>() * DROP_JITTER_MS) as u64
    }

    fn setup_ducks(&mut self, canvas: CanvasSize, rng: &mut StdRng) {
        let spacing = (canvas.width - DUCK_PADDING * 2.0) / (DUCK_COUNT - 1) as f32;
        self.ducks = (0..DUCK_COUNT)
            .map(|i| {
                let wobble = rng.gen::<f32>() * TAU;
                let offset = (rng.gen::<f32>() * FIRST_DROP_JITTER_MS) as u64;
                Duck {
                    position: Point::new(DUCK_PADDING + i as f32 * spacing, DUCK_Y),
                    wobble,
                    next_drop_ms: Self::next_drop(offset, rng),
                }
            })
            .collect();
    }

    fn spawn_item(&mut self, from: Point, rng: &mut StdRng) {
        let kind = if rng.gen::<f32>() > WASTE_CHANCE {
            ItemKind::Egg
        } else {
            ItemKind::Waste
        };
        self.items.push(Item {
            kind,
            center: Point::new(from.x, from.y + ITEM_DROP_OFFSET),
            speed: uniform(rng, MIN_ITEM_SPEED, MAX_ITEM_SPEED),
            rotation: 0.0,
            rotation_speed: (rng.gen::<f32>() - 0.5) * 0.2,
        });
    }

    fn in_basket(&self, item: &Item) -> bool {
        let basket = self.basket_position();
        let in_x = (item.center.x - basket.x).abs() < BASKET_WIDTH / 2.0 + CATCH_SLACK_X;
        let in_y = item.center.y > basket.y - CATCH_BAND_ABOVE
            && item.center.y < basket.y + CATCH_BAND_BELOW;
        in_x && in_y
    }
}

impl Activity for DuckCatch {
    fn kind(&self) -> ActivityKind {
        ActivityKind::DuckCatch
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) {
        let canvas = ctx.canvas;
        self.items.clear();
        self.eggs_caught = 0;
        self.waste_caught = 0;
        self.target_x = canvas.width / 2.0;
        self.basket.set(self.target_x);
        self.basket_y = canvas.height - BASKET_OFFSET;
        self.setup_ducks(canvas, ctx.rng);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<TickOutcome> {
        let canvas = ctx.canvas;
        let now_ms = ctx.now_ms;
        for duck_idx in 0..self.ducks.len() {
            if self.items.len() >= MAX_ITEMS {
                break;
            }
            let duck = self.ducks[duck_idx];
            if now_ms >= duck.next_drop_ms {
                self.spawn_item(duck.position, ctx.rng);
                self.ducks[duck_idx].next_drop_ms = Self::next_drop(now_ms, ctx.rng);
            }
        }

        if let Some(hand) = ctx.hands.primary() {
            self.target_x = canvas.project(&hand.index_tip()).x;
        }
        let half = BASKET_WIDTH / 2.0;
        let smoothed = self.basket.step(self.target_x);
        self.basket.set(smoothed.clamp(half, (canvas.width - half).max(half)));

        for item in &mut self.items {
            item.center.y += item.speed;
            item.rotation += item.rotation_speed;
        }
        for duck in &mut self.ducks {
            duck.wobble += DUCK_WOBBLE_STEP;
        }

        let mut idx = self.items.len();
        while idx > 0 {
            idx -= 1;
            let item = self.items[idx];
            if self.in_basket(&item) {
                self.items.remove(idx);
                item.kind.apply(ctx.score);
                match item.kind {
                    ItemKind::Egg => self.eggs_caught += 1,
                    ItemKind::Waste => self.waste_caught += 1,
                }
                log_debug!("caught {:?}, score {}", item.kind, ctx.score.value());
            } else if item.center.y > canvas.height + ESCAPE_MARGIN {
                self.items.remove(idx);
            }
        }

        Ok(TickOutcome::Continue)
    }

    fn render(&self, frame: &mut RenderFrame) {
        for duck in &self.ducks {
            let center = Point::new(
                duck.position.x,
                duck.position.y + duck.wobble.sin() * DUCK_WOBBLE_AMPLITUDE,
            );
            frame.push(Sprite::new(SpriteKind::Duck, center, DUCK_RADIUS));
        }
        for item in &self.items {
            let kind = match item.kind {
                ItemKind::Egg => SpriteKind::Egg,
                ItemKind::Waste => SpriteKind::Waste,
            };
            frame.push(Sprite::new(kind, item.center, ITEM_RADIUS).rotated(item.rotation));
        }
        frame.push(Sprite::new(
            SpriteKind::Basket {
                width: BASKET_WIDTH,
                height: BASKET_HEIGHT,
            },
            self.basket_position(),
            BASKET_WIDTH / 2.0,
        ));
    }
}
