//! World<->screen camera transform: pan, zoom-around-pivot.

use crate::geometry::{clamp, ScreenPoint, WorldPoint};

pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 5.0;
pub const DEFAULT_ZOOM: f32 = 1.0;

/// `screen = (world + pan) * zoom`, therefore `world = screen/zoom - pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, p: WorldPoint) -> ScreenPoint {
        ScreenPoint::new((p.x + self.pan_x) * self.zoom, (p.y + self.pan_y) * self.zoom)
    }

    pub fn screen_to_world(&self, p: ScreenPoint) -> WorldPoint {
        WorldPoint::new(p.x / self.zoom - self.pan_x, p.y / self.zoom - self.pan_y)
    }

    /// `pan += (dx, dy)/zoom`
    pub fn pan(&mut self, dx_screen: f32, dy_screen: f32) {
        self.pan_x += dx_screen / self.zoom;
        self.pan_y += dy_screen / self.zoom;
    }

    /// Rescales around `pivot` (screen space) such that the world point
    /// under the pivot is unchanged by the operation.
    pub fn zoom_at(&mut self, factor: f32, pivot: ScreenPoint) {
        let world_under_pivot = self.screen_to_world(pivot);
        self.zoom = clamp(self.zoom * factor, MIN_ZOOM, MAX_ZOOM);
        // Solve pan so `world_under_pivot` maps back to `pivot`.
        self.pan_x = pivot.x / self.zoom - world_under_pivot.x;
        self.pan_y = pivot.y / self.zoom - world_under_pivot.y;
    }

    /// The world-space rectangle visible through a screen of the given size.
    pub fn visible_world_rect(&self, width: f32, height: f32) -> (WorldPoint, WorldPoint) {
        let min = self.screen_to_world(ScreenPoint::new(0.0, 0.0));
        let max = self.screen_to_world(ScreenPoint::new(width, height));
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_screen_world() {
        let cam = Camera {
            pan_x: 12.0,
            pan_y: -4.0,
            zoom: 2.5,
        };
        let q = ScreenPoint::new(123.0, 456.0);
        let back = cam.world_to_screen(cam.screen_to_world(q));
        assert!((back.x - q.x).abs() < 1e-6);
        assert!((back.y - q.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_preserves_world_point_under_pivot() {
        let mut cam = Camera {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        };
        let pivot = ScreenPoint::new(300.0, 200.0);
        let before = cam.screen_to_world(pivot);
        cam.zoom_at(2.0, pivot);
        let after = cam.screen_to_world(pivot);
        assert!((before.x - after.x).abs() < 1e-6);
        assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.zoom_at(100.0, ScreenPoint::new(0.0, 0.0));
        assert_eq!(cam.zoom, MAX_ZOOM);
        cam.zoom_at(0.0001, ScreenPoint::new(0.0, 0.0));
        assert_eq!(cam.zoom, MIN_ZOOM);
    }

    #[test]
    fn pan_divides_by_zoom() {
        let mut cam = Camera {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 2.0,
        };
        cam.pan(10.0, 20.0);
        assert_eq!(cam.pan_x, 5.0);
        assert_eq!(cam.pan_y, 10.0);
    }
}
