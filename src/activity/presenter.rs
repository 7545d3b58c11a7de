//! Presentation port: the only way activity state reaches a screen.

use anyhow::Result;
use serde::Serialize;

use super::ActivityKind;
use crate::{gesture::Point, utils::time::format_time};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SpriteKind {
    Star,
    /// Flash left where a star was caught.
    CatchFlash,
    Balloon { color: u8 },
    Particle { alpha: f32 },
    /// Tracked fingertip; `pinching` switches the reticle style.
    Pointer { pinching: bool },
    Duck,
    Egg,
    Waste,
    Basket { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite {
    pub kind: SpriteKind,
    pub center: Point,
    pub radius: f32,
    pub rotation: f32,
}

impl Sprite {
    pub fn new(kind: SpriteKind, center: Point, radius: f32) -> Self {
        Self {
            kind,
            center,
            radius,
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Everything needed to draw one frame, in back-to-front order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub activity: ActivityKind,
    pub score: u32,
    pub elapsed_secs: u64,
    pub sprites: Vec<Sprite>,
    pub prompt: Option<String>,
    pub subtext: Option<String>,
}

impl RenderFrame {
    pub fn new(activity: ActivityKind, score: u32, elapsed_secs: u64) -> Self {
        Self {
            activity,
            score,
            elapsed_secs,
            sprites: Vec::new(),
            prompt: None,
            subtext: None,
        }
    }

    pub fn push(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    pub fn time_label(&self) -> String {
        format_time(self.elapsed_secs)
    }

    pub fn count(&self, matches: impl Fn(&SpriteKind) -> bool) -> usize {
        self.sprites.iter().filter(|sprite| matches(&sprite.kind)).count()
    }
}

/// Implemented by the host's drawing surface.
///
/// Errors abort the cadence and surface from `ActivityRunner::stop`.
pub trait Presenter: Send {
    fn set_score_display(&mut self, score: u32);

    fn draw_frame(&mut self, frame: &RenderFrame) -> Result<()>;
}

/// Discards every frame.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn set_score_display(&mut self, _score: u32) {}

    fn draw_frame(&mut self, _frame: &RenderFrame) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_label_uses_minutes_and_seconds() {
        let frame = RenderFrame::new(ActivityKind::CatchStars, 3, 125);
        assert_eq!(frame.time_label(), "2:05");
    }

    #[test]
    fn sprite_json_is_tagged() {
        let sprite = Sprite::new(SpriteKind::Balloon { color: 2 }, Point::new(1.0, 2.0), 40.0);
        let value = serde_json::to_value(sprite).unwrap();
        assert_eq!(value["kind"]["type"], "balloon");
        assert_eq!(value["kind"]["color"], 2);
    }
}
