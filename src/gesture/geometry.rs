use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::landmarks::Landmark;

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        // Camera resolution the detector is configured with.
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            bail!(
                "canvas dimensions must be positive, got {}x{}",
                self.width,
                self.height
            );
        }
        Ok(())
    }

    /// Projects a normalized landmark into pixel space.
    pub fn project(&self, landmark: &Landmark) -> Point {
        Point {
            x: landmark.x * self.width,
            y: landmark.y * self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Proximity test between a tracked point and a round entity.
///
/// `margin` widens the entity to absorb landmark jitter.
pub fn collides(probe: Point, center: Point, radius: f32, margin: f32) -> bool {
    distance(probe, center) < radius + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_normalized_to_pixels() {
        let canvas = CanvasSize::new(640.0, 480.0).unwrap();
        let point = canvas.project(&Landmark::new(0.25, 0.5));
        assert_eq!(point, Point::new(160.0, 240.0));
    }

    #[test]
    fn rejects_empty_canvas() {
        assert!(CanvasSize::new(0.0, 480.0).is_err());
        assert!(CanvasSize::new(640.0, -1.0).is_err());
    }

    #[test]
    fn collision_margin_is_exclusive() {
        let star = Point::new(100.0, 100.0);
        assert!(collides(Point::new(115.0, 100.0), star, 20.0, 30.0));
        assert!(!collides(Point::new(200.0, 100.0), star, 20.0, 30.0));
        // Exactly radius + margin away is a miss.
        assert!(!collides(Point::new(150.0, 100.0), star, 20.0, 30.0));
    }
}
