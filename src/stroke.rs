//! The stroke data model: points, their frozen render config, and the
//! committed stroke itself.

use crate::geometry::{Bounds, Color, WorldPoint};
use serde::{Deserialize, Serialize};

/// A single conditioned input sample, already in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    pub timestamp: f64,
    #[serde(rename = "tiltX")]
    pub tilt_x: f32,
    #[serde(rename = "tiltY")]
    pub tilt_y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, pressure: f32, timestamp: f64) -> Self {
        Point {
            x,
            y,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp,
            tilt_x: 0.0,
            tilt_y: 0.0,
        }
    }

    pub fn with_tilt(mut self, tilt_x: f32, tilt_y: f32) -> Self {
        self.tilt_x = tilt_x.clamp(-90.0, 90.0);
        self.tilt_y = tilt_y.clamp(-90.0, 90.0);
        self
    }

    pub fn world(self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    pub fn tilt_magnitude(self) -> f32 {
        self.tilt_x.hypot(self.tilt_y)
    }
}

/// Per-stroke rendering parameters, frozen at stroke creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub color: Color,
    pub opacity: f32,
    #[serde(rename = "baseStrokeWidth")]
    pub base_stroke_width: f32,
    #[serde(rename = "minWidth")]
    pub min_width: f32,
    #[serde(rename = "maxWidth")]
    pub max_width: f32,
    pub smoothness: f32,
    pub streamline: f32,
    #[serde(rename = "pressureInfluence")]
    pub pressure_influence: f32,
    #[serde(rename = "velocityInfluence")]
    pub velocity_influence: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            color: Color::default(),
            opacity: 1.0,
            base_stroke_width: 4.0,
            min_width: 1.0,
            max_width: 20.0,
            smoothness: 0.5,
            streamline: 0.5,
            pressure_influence: 0.5,
            velocity_influence: 0.5,
        }
    }
}

/// A committed, ordered sequence of points plus the config frozen at
/// creation time. Once appended to the document, points are mutated only
/// by bulk translation (`move`); color changes only by replacing `config`
/// wholesale via a recolor action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub config: RenderConfig,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(config: RenderConfig, points: Vec<Point>) -> Self {
        Stroke { config, points }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().map(|p| p.world()))
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    pub fn scale_about(&mut self, pivot: WorldPoint, sx: f32, sy: f32) {
        for p in &mut self.points {
            p.x = pivot.x + (p.x - pivot.x) * sx;
            p.y = pivot.y + (p.y - pivot.y) * sy;
        }
    }

    pub fn average_pressure(&self) -> f32 {
        if self.points.is_empty() {
            return 0.5;
        }
        self.points.iter().map(|p| p.pressure).sum::<f32>() / self.points.len() as f32
    }

    pub fn average_tilt(&self) -> (f32, f32) {
        if self.points.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.points.len() as f32;
        let tx = self.points.iter().map(|p| p.tilt_x).sum::<f32>() / n;
        let ty = self.points.iter().map(|p| p.tilt_y).sum::<f32>() / n;
        (tx, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_moves_every_point() {
        let mut s = Stroke::new(
            RenderConfig::default(),
            vec![Point::new(0.0, 0.0, 0.5, 0.0), Point::new(1.0, 1.0, 0.5, 10.0)],
        );
        s.translate(2.0, -1.0);
        assert_eq!(s.points[0].x, 2.0);
        assert_eq!(s.points[0].y, -1.0);
        assert_eq!(s.points[1].x, 3.0);
        assert_eq!(s.points[1].y, 0.0);
    }

    #[test]
    fn bounds_of_empty_stroke_is_none() {
        let s = Stroke::new(RenderConfig::default(), vec![]);
        assert!(s.bounds().is_none());
    }
}
