//! The `RenderTarget` contract and the two built-in implementations: a
//! `tiny-skia`-backed raster target (used by the exporter) and a
//! recording target (used by tests to assert on emitted drawing ops
//! without a real surface).

use crate::camera::Camera;
use crate::document::Document;
use crate::geometry::{Color, ColorExt, WorldPoint};
use crate::grid::{self, GridPrimitive, GridType};
use crate::tess::{self, Tessellation};
use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke as SkStroke, Transform};

pub trait RenderTarget {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32);
    fn stroke_segment(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color, alpha: f32);
    fn fill_disk(&mut self, cx: f32, cy: f32, radius: f32, color: Color, alpha: f32);
    fn set_transform(&mut self, camera: &Camera);
}

/// Draws the grid, then every stroke in document order, into `target`.
/// Shared by the exporter and by any host that wants a reference
/// implementation of "how to redraw everything".
pub fn redraw<T: RenderTarget>(target: &mut T, document: &Document, camera: &Camera, width: f32, height: f32, paper_color: Color) {
    target.set_transform(camera);
    target.clear(paper_color);

    for prim in grid::emit(document.grid_type, camera, width, height) {
        match prim {
            GridPrimitive::Line { from, to, width, color, alpha } => {
                target.stroke_segment(from.x, from.y, to.x, to.y, width, color, alpha);
            }
            GridPrimitive::Disk { center, radius, color, alpha } => {
                target.fill_disk(center.x, center.y, radius, color, alpha);
            }
        }
    }

    for stroke in &document.strokes {
        draw_stroke(target, stroke);
    }
}

fn draw_stroke<T: RenderTarget>(target: &mut T, stroke: &crate::stroke::Stroke) {
    let color = stroke.config.color;
    let alpha = stroke.config.opacity;
    match tess::tessellate(stroke) {
        Tessellation::Dot { center, radius } => {
            target.fill_disk(center.x, center.y, radius, color, alpha);
        }
        Tessellation::Segments(segments) => {
            for seg in segments {
                target.stroke_segment(seg.from.x, seg.from.y, seg.to.x, seg.to.y, seg.width, color, alpha);
            }
        }
    }
}

/// `tiny-skia`-backed raster target, the crate's one concrete rasterizer.
pub struct RasterTarget {
    pixmap: Pixmap,
    camera: Camera,
}

impl RasterTarget {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(RasterTarget {
            pixmap: Pixmap::new(width, height)?,
            camera: Camera::default(),
        })
    }

    pub fn into_png_bytes(self) -> Option<Vec<u8>> {
        self.pixmap.encode_png().ok()
    }

    fn to_screen(&self, x: f32, y: f32) -> WorldPoint {
        let p = self.camera.world_to_screen(crate::geometry::WorldPoint::new(x, y));
        WorldPoint::new(p.x, p.y)
    }

    fn paint(color: Color, alpha: f32) -> Paint<'static> {
        let mut paint = Paint::default();
        let [r, g, b] = color;
        paint.set_color_rgba8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0) as u8);
        paint.anti_alias = true;
        paint
    }
}

impl RenderTarget for RasterTarget {
    fn clear(&mut self, color: Color) {
        let [r, g, b] = color;
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32) {
        let top_left = self.to_screen(x, y);
        let bottom_right = self.to_screen(x + w, y + h);
        if let Some(rect) = tiny_skia::Rect::from_ltrb(top_left.x, top_left.y, bottom_right.x, bottom_right.y) {
            self.pixmap.fill_rect(rect, &Self::paint(color, alpha), Transform::identity(), None);
        }
    }

    fn stroke_segment(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color, alpha: f32) {
        let a = self.to_screen(x1, y1);
        let b = self.to_screen(x2, y2);
        let mut pb = PathBuilder::new();
        pb.move_to(a.x, a.y);
        pb.line_to(b.x, b.y);
        if let Some(path) = pb.finish() {
            let stroke = SkStroke {
                width: (width * self.camera.zoom).max(0.1),
                line_cap: tiny_skia::LineCap::Round,
                ..Default::default()
            };
            self.pixmap.stroke_path(&path, &Self::paint(color, alpha), &stroke, Transform::identity(), None);
        }
    }

    fn fill_disk(&mut self, cx: f32, cy: f32, radius: f32, color: Color, alpha: f32) {
        let center = self.to_screen(cx, cy);
        let r = radius * self.camera.zoom;
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, r.max(0.1)) {
            self.pixmap.fill_path(&path, &Self::paint(color, alpha), tiny_skia::FillRule::Winding, Transform::identity(), None);
        }
    }

    fn set_transform(&mut self, camera: &Camera) {
        self.camera = *camera;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    FillRect { x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32 },
    StrokeSegment { x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color, alpha: f32 },
    FillDisk { cx: f32, cy: f32, radius: f32, color: Color, alpha: f32 },
    SetTransform(Camera),
}

/// Appends every call, unscaled, to a log the tests can assert against.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    pub ops: Vec<DrawOp>,
}

impl RenderTarget for RecordingTarget {
    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32) {
        self.ops.push(DrawOp::FillRect { x, y, w, h, color, alpha });
    }
    fn stroke_segment(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color, alpha: f32) {
        self.ops.push(DrawOp::StrokeSegment { x1, y1, x2, y2, width, color, alpha });
    }
    fn fill_disk(&mut self, cx: f32, cy: f32, radius: f32, color: Color, alpha: f32) {
        self.ops.push(DrawOp::FillDisk { cx, cy, radius, color, alpha });
    }
    fn set_transform(&mut self, camera: &Camera) {
        self.ops.push(DrawOp::SetTransform(*camera));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{Point, RenderConfig};

    #[test]
    fn redraw_emits_set_transform_then_strokes() {
        let mut doc = Document::new();
        doc.add_stroke(crate::stroke::Stroke::new(
            RenderConfig::default(),
            vec![Point::new(0.0, 0.0, 0.5, 0.0), Point::new(10.0, 0.0, 0.5, 16.0)],
        ));
        let mut target = RecordingTarget::default();
        redraw(&mut target, &doc, &Camera::default(), 800.0, 600.0, Color::WHITE);

        assert!(matches!(target.ops[0], DrawOp::SetTransform(_)));
        assert!(matches!(target.ops[1], DrawOp::Clear(_)));
        assert!(target.ops.iter().any(|op| matches!(op, DrawOp::StrokeSegment { .. })));
    }

    #[test]
    fn raster_target_can_be_encoded() {
        let mut target = RasterTarget::new(32, 32).unwrap();
        target.set_transform(&Camera::default());
        target.clear(Color::WHITE);
        target.stroke_segment(0.0, 0.0, 10.0, 10.0, 2.0, Color::BLACK, 1.0);
        let bytes = target.into_png_bytes();
        assert!(bytes.is_some());
    }
}
