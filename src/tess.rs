//! Catmull-Rom -> cubic Bezier -> polyline tessellation with per-segment
//! variable width.

use crate::geometry::{clamp, WorldPoint};
use crate::stroke::{Point, RenderConfig, Stroke};
use crate::width;
use lyon_geom::{CubicBezierSegment, Point as LyonPoint};

/// One flat-shaded segment ready for `RenderTarget::stroke_segment`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessSegment {
    pub from: WorldPoint,
    pub to: WorldPoint,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tessellation {
    /// Single-point stroke: a filled disk.
    Dot { center: WorldPoint, radius: f32 },
    Segments(Vec<TessSegment>),
}

fn to_lyon(p: WorldPoint) -> LyonPoint<f32> {
    LyonPoint::new(p.x, p.y)
}

fn from_lyon(p: LyonPoint<f32>) -> WorldPoint {
    WorldPoint::new(p.x, p.y)
}

/// Full (non-incremental) tessellation of a committed or in-progress
/// stroke, used for final redraw after `endStroke`.
pub fn tessellate(stroke: &Stroke) -> Tessellation {
    let cfg = &stroke.config;
    let pts = &stroke.points;

    match pts.len() {
        0 => Tessellation::Segments(vec![]),
        1 => {
            let p = pts[0];
            let radius = width::dot_width(
                cfg.base_stroke_width,
                cfg.min_width,
                cfg.max_width,
                cfg.pressure_influence,
                p,
            ) / 2.0;
            Tessellation::Dot {
                center: p.world(),
                radius,
            }
        }
        2 | 3 => Tessellation::Segments(tessellate_short_polyline(cfg, pts)),
        _ => Tessellation::Segments(tessellate_full(cfg, pts)),
    }
}

fn tessellate_short_polyline(cfg: &RenderConfig, pts: &[Point]) -> Vec<TessSegment> {
    let avg_pressure = pts.iter().map(|p| p.pressure).sum::<f32>() / pts.len() as f32;
    let p_factor = cfg.pressure_influence * avg_pressure + (1.0 - cfg.pressure_influence) * 0.5;
    let w = clamp(cfg.base_stroke_width * p_factor * 0.5, cfg.min_width, cfg.max_width);

    pts.windows(2)
        .map(|w2| TessSegment {
            from: w2[0].world(),
            to: w2[1].world(),
            width: w,
        })
        .collect()
}

fn tessellate_full(cfg: &RenderConfig, pts: &[Point]) -> Vec<TessSegment> {
    // One width per point: the first point borrows the width of the
    // segment leading into it (forward difference), every other point
    // uses the segment arriving from its predecessor.
    let mut per_point_width: Vec<f32> = {
        let mut widths = Vec::with_capacity(pts.len());
        widths.push(width::segment_width(
            cfg.base_stroke_width,
            cfg.min_width,
            cfg.max_width,
            cfg.pressure_influence,
            cfg.velocity_influence,
            pts[1],
            pts[0],
        ));
        for w in pts.windows(2) {
            widths.push(width::segment_width(
                cfg.base_stroke_width,
                cfg.min_width,
                cfg.max_width,
                cfg.pressure_influence,
                cfg.velocity_influence,
                w[1],
                w[0],
            ));
        }
        widths
    };

    let n = pts.len();
    // Taper ramps over the first/last `t` original point-to-point
    // segments, so it has to land before subdivision: applying it to
    // the flattened sub-segment list would stretch the ramp across
    // however many `steps` each segment got split into.
    width::apply_taper(&mut per_point_width, n);

    let mut segments = Vec::new();

    for i in 0..n - 1 {
        // The four-point Catmull-Rom window centered on the (p1,p2) span;
        // clamp indices at the ends by repeating the boundary point.
        let i0 = i.saturating_sub(1);
        let i1 = i;
        let i2 = i + 1;
        let i3 = (i + 2).min(n - 1);

        let p0 = pts[i0].world();
        let p1 = pts[i1].world();
        let p2 = pts[i2].world();
        let p3 = pts[i3].world();

        let denom = (6.0 * (1.0 - cfg.smoothness)).max(1e-3);
        let cp1 = p1 + (p2 - p0) * (1.0 / denom);
        let cp2 = p2 - (p3 - p1) * (1.0 / denom);

        let bez = CubicBezierSegment {
            from: to_lyon(p1),
            ctrl1: to_lyon(cp1),
            ctrl2: to_lyon(cp2),
            to: to_lyon(p2),
        };

        let chord_l1 = (p2.x - p1.x).abs() + (p2.y - p1.y).abs();
        let steps = ((chord_l1 / 5.0).ceil() as u32).clamp(2, 8);

        let w_start = per_point_width[i1];
        let w_end = per_point_width[i2.min(per_point_width.len() - 1)];

        let mut prev = from_lyon(bez.from);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let pos = from_lyon(bez.sample(t));
            let w = crate::geometry::lerp(w_start, w_end, t);
            segments.push(TessSegment {
                from: prev,
                to: pos,
                width: w,
            });
            prev = pos;
        }
    }

    segments
}

/// The "incremental tip": a flat line segment drawn immediately as a new
/// sample arrives mid-stroke, replaced by `tessellate` on `endStroke`.
pub fn incremental_tip(cfg: &RenderConfig, previous: Point, current: Point) -> TessSegment {
    let w = width::segment_width(
        cfg.base_stroke_width,
        cfg.min_width,
        cfg.max_width,
        cfg.pressure_influence,
        cfg.velocity_influence,
        current,
        previous,
    );
    TessSegment {
        from: previous.world(),
        to: current.world(),
        width: w,
    }
}
