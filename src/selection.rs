//! Hit-testing and selection geometry: point-to-polyline distance, bbox
//! overlap, and lasso point-in-polygon containment.

use crate::geometry::{Bounds, WorldPoint};
use crate::stroke::Stroke;

/// Perpendicular distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: WorldPoint, a: WorldPoint, b: WorldPoint) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq < 1e-12 {
        return p.dist(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    p.dist(projection)
}

/// Point-tap hit test against a single stroke's polyline, with a
/// bounding-box pre-filter.
pub fn stroke_hit(stroke: &Stroke, p: WorldPoint, half_width: f32, tolerance: f32) -> bool {
    let Some(bounds) = stroke.bounds() else {
        return false;
    };
    let inflated = bounds.inflate(half_width + tolerance);
    if !inflated.contains_point(p) {
        return false;
    }
    if stroke.points.len() == 1 {
        return p.dist(stroke.points[0].world()) <= half_width + tolerance;
    }
    stroke
        .points
        .windows(2)
        .any(|w| distance_to_segment(p, w[0].world(), w[1].world()) <= half_width + tolerance)
}

/// Rectangle selection: bbox-overlap semantics, not full containment.
pub fn rect_overlaps(stroke_bounds: &Bounds, rect: &Bounds) -> bool {
    stroke_bounds.overlaps(rect)
}

/// Even-odd ray-casting point-in-polygon test. Points exactly on an edge
/// are treated as outside, per the spec's boundary convention.
pub fn point_in_polygon(p: WorldPoint, polygon: &[WorldPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];
        let on_segment = distance_to_segment(p, vi, vj) < 1e-6;
        if on_segment {
            return false;
        }
        let intersects = ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Lasso containment: selects by the stroke's bounding-box *center*.
pub fn lasso_contains_stroke(stroke_bounds: &Bounds, polygon: &[WorldPoint]) -> bool {
    point_in_polygon(stroke_bounds.center(), polygon)
}
