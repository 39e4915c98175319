//! Post-stroke gesture recognition: scratch-to-erase and shape-snap.
//! Runs once on `endStroke`, before the stroke is logged as an
//! `addStroke` action.

use crate::geometry::{Bounds, WorldPoint};
use crate::stroke::Point;
use std::f32::consts::{FRAC_PI_2, PI};

const SCRATCH_MIN_POINTS: usize = 15;
const SCRATCH_MIN_REVERSALS: u32 = 4;
const SCRATCH_LENGTH_RATIO: f32 = 2.5;
const SCRATCH_DX_THRESHOLD: f32 = 2.0;
const SCRATCH_BBOX_INFLATE: f32 = 5.0;

const SNAP_MIN_POINTS: usize = 4;
const SNAP_DWELL_MS: f64 = 250.0;
const SNAP_STILL_THRESHOLD: f32 = 2.0;
const HOLD_STILL_CLUSTER_RADIUS: f32 = 4.0;

/// Counts horizontal direction reversals over samples whose `|Δx| > 2`,
/// and the raw path length / bbox diagonal, to classify a scratch-erase
/// gesture. Returns the scratch bbox (inflated by 5 world-px) if the
/// stroke should be treated as a scratch.
pub fn detect_scratch(points: &[Point]) -> Option<Bounds> {
    if points.len() < SCRATCH_MIN_POINTS {
        return None;
    }

    let mut reversals = 0u32;
    let mut last_dir: Option<f32> = None;
    let mut total_length = 0.0f32;

    for w in points.windows(2) {
        let dx = w[1].x - w[0].x;
        let dy = w[1].y - w[0].y;
        total_length += dx.hypot(dy);

        if dx.abs() > SCRATCH_DX_THRESHOLD {
            let dir = dx.signum();
            if let Some(prev) = last_dir {
                if prev != dir {
                    reversals += 1;
                }
            }
            last_dir = Some(dir);
        }
    }

    let bounds = Bounds::from_points(points.iter().map(|p| p.world()))?;
    let diagonal = bounds.diagonal();

    if reversals >= SCRATCH_MIN_REVERSALS && total_length > SCRATCH_LENGTH_RATIO * diagonal {
        Some(bounds.inflate(SCRATCH_BBOX_INFLATE))
    } else {
        None
    }
}

/// True if the pen held still (no movement > 2 world-px) for at least
/// 250ms before the final point. A clock regression is treated as
/// dwell = 0 (never triggers).
fn dwelled_before_lift(points: &[Point]) -> bool {
    let Some(last) = points.last() else {
        return false;
    };
    let mut still_since = last.timestamp;
    for p in points.iter().rev().skip(1) {
        if p.timestamp > still_since {
            // clock regression somewhere in the tail: treat dwell as 0.
            return false;
        }
        if p.world().dist(last.world()) > SNAP_STILL_THRESHOLD {
            break;
        }
        still_since = p.timestamp;
    }
    last.timestamp - still_since >= SNAP_DWELL_MS
}

/// Drops trailing "hold-still" points clustered within 4px of the last
/// point, keeping exactly one representative (the last).
fn strip_hold_still_tail(points: &[Point]) -> Vec<Point> {
    let Some(last) = points.last().copied() else {
        return vec![];
    };
    let mut cut = points.len();
    for (i, p) in points.iter().enumerate().rev() {
        if p.world().dist(last.world()) > HOLD_STILL_CLUSTER_RADIUS {
            cut = i + 1;
            break;
        }
        cut = i;
    }
    let mut out = points[..cut].to_vec();
    out.push(last);
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapShape {
    Line { from: WorldPoint, to: WorldPoint },
    Circle { center: WorldPoint, radius: f32 },
    Ellipse { center: WorldPoint, rx: f32, ry: f32 },
    RoundedRect { bounds: Bounds, corner_radius: f32 },
}

/// Attempts a shape-snap classification. Returns `None` if the dwell or
/// point-count preconditions aren't met, or if no shape scores well
/// enough.
pub fn classify_shape(raw_points: &[Point]) -> Option<SnapShape> {
    if raw_points.len() < SNAP_MIN_POINTS || !dwelled_before_lift(raw_points) {
        return None;
    }

    let points = strip_hold_still_tail(raw_points);
    if points.len() < SNAP_MIN_POINTS {
        return None;
    }

    let bounds = Bounds::from_points(points.iter().map(|p| p.world()))?;
    let diagonal = bounds.diagonal();
    let first = points[0].world();
    let last = points[points.len() - 1].world();
    let closed = first.dist(last) <= 0.35 * diagonal;

    if closed {
        classify_closed(&points, &bounds)
    } else {
        classify_open(&points, first, last)
    }
}

fn classify_closed(points: &[Point], bounds: &Bounds) -> Option<SnapShape> {
    let centroid = bounds.center();
    let w = bounds.width().max(1e-6);
    let h = bounds.height().max(1e-6);
    let rx = w / 2.0;
    let ry = h / 2.0;

    let distances: Vec<f32> = points.iter().map(|p| p.world().dist(centroid)).collect();
    let avg_d = distances.iter().sum::<f32>() / distances.len() as f32;
    let variance = distances.iter().map(|d| (d - avg_d).powi(2)).sum::<f32>() / distances.len() as f32;
    let circle_score = variance.sqrt() / avg_d.max(1e-6);

    let aspect = w.max(h) / w.min(h).max(1.0);

    let ellipse_score = points
        .iter()
        .map(|p| {
            let p = p.world();
            let nx = (p.x - centroid.x) / rx;
            let ny = (p.y - centroid.y) / ry;
            (nx * nx + ny * ny - 1.0).abs()
        })
        .sum::<f32>()
        / points.len() as f32;

    let edge_tolerance = 0.15 * w.min(h);
    let rect_score = points
        .iter()
        .filter(|p| {
            let p = p.world();
            let near_vertical = (p.x - bounds.min.x).abs() < edge_tolerance || (p.x - bounds.max.x).abs() < edge_tolerance;
            let near_horizontal = (p.y - bounds.min.y).abs() < edge_tolerance || (p.y - bounds.max.y).abs() < edge_tolerance;
            near_vertical || near_horizontal
        })
        .count() as f32
        / points.len() as f32;

    let corner_radius = (0.12 * w.min(h)).min(20.0);

    if circle_score < 0.22 && aspect < 1.4 {
        Some(SnapShape::Circle {
            center: centroid,
            radius: (rx + ry) / 2.0,
        })
    } else if rect_score > 0.70 {
        Some(SnapShape::RoundedRect {
            bounds: *bounds,
            corner_radius,
        })
    } else if ellipse_score < 0.20 && aspect >= 1.4 {
        Some(SnapShape::Ellipse { center: centroid, rx, ry })
    } else if circle_score < 0.38 {
        if aspect < 1.5 {
            Some(SnapShape::Circle {
                center: centroid,
                radius: (rx + ry) / 2.0,
            })
        } else {
            Some(SnapShape::Ellipse { center: centroid, rx, ry })
        }
    } else if rect_score > 0.50 {
        Some(SnapShape::RoundedRect {
            bounds: *bounds,
            corner_radius,
        })
    } else if ellipse_score < 0.35 {
        Some(SnapShape::Ellipse { center: centroid, rx, ry })
    } else {
        None
    }
}

fn classify_open(points: &[Point], first: WorldPoint, last: WorldPoint) -> Option<SnapShape> {
    let chord_len = first.dist(last);
    if chord_len < 1e-6 {
        return None;
    }
    let max_dev = points
        .iter()
        .map(|p| crate::selection::distance_to_segment(p.world(), first, last))
        .fold(0.0f32, f32::max);

    if max_dev / chord_len < 0.10 {
        Some(SnapShape::Line { from: first, to: last })
    } else {
        None
    }
}

/// Regenerates the canonical point sequence for a snapped shape,
/// preserving the stroke's average pressure/tilt on every new point.
/// Timestamps are a synthetic monotonic sequence seeded from the last
/// raw timestamp (see DESIGN.md: source ambiguity around arc-time).
pub fn regenerate_points(shape: SnapShape, avg_pressure: f32, avg_tilt: (f32, f32), seed_timestamp: f64) -> Vec<Point> {
    let mk = |x: f32, y: f32, i: usize| {
        Point::new(x, y, avg_pressure, seed_timestamp + i as f64).with_tilt(avg_tilt.0, avg_tilt.1)
    };

    match shape {
        SnapShape::Line { from, to } => {
            const N: usize = 4;
            (0..N)
                .map(|i| {
                    let t = i as f32 / (N - 1) as f32;
                    mk(
                        crate::geometry::lerp(from.x, to.x, t),
                        crate::geometry::lerp(from.y, to.y, t),
                        i,
                    )
                })
                .collect()
        }
        SnapShape::Circle { center, radius } => ellipse_points(center, radius, radius, seed_timestamp, avg_pressure, avg_tilt),
        SnapShape::Ellipse { center, rx, ry } => ellipse_points(center, rx, ry, seed_timestamp, avg_pressure, avg_tilt),
        SnapShape::RoundedRect { bounds, corner_radius } => {
            rounded_rect_points(bounds, corner_radius, seed_timestamp, avg_pressure, avg_tilt)
        }
    }
}

fn ellipse_points(center: WorldPoint, rx: f32, ry: f32, seed: f64, pressure: f32, tilt: (f32, f32)) -> Vec<Point> {
    const N: usize = 65;
    (0..N)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / (N - 1) as f32;
            Point::new(
                center.x + rx * angle.cos(),
                center.y + ry * angle.sin(),
                pressure,
                seed + i as f64,
            )
            .with_tilt(tilt.0, tilt.1)
        })
        .collect()
}

fn rounded_rect_points(bounds: Bounds, r: f32, seed: f64, pressure: f32, tilt: (f32, f32)) -> Vec<Point> {
    let (min, max) = (bounds.min, bounds.max);
    let r = r.min(bounds.width() / 2.0).min(bounds.height() / 2.0).max(0.0);
    let mut pts: Vec<WorldPoint> = Vec::new();

    let arc = |center: WorldPoint, start_angle: f32, end_angle: f32, pts: &mut Vec<WorldPoint>| {
        const STEPS: usize = 8;
        for i in 0..=STEPS {
            let t = i as f32 / STEPS as f32;
            let angle = start_angle + (end_angle - start_angle) * t;
            pts.push(WorldPoint::new(center.x + r * angle.cos(), center.y + r * angle.sin()));
        }
    };

    // Start at top edge, go clockwise: top, right, bottom, left, corners.
    pts.push(WorldPoint::new(min.x + r, min.y));
    pts.push(WorldPoint::new(max.x - r, min.y));
    arc(WorldPoint::new(max.x - r, min.y + r), -FRAC_PI_2, 0.0, &mut pts);
    pts.push(WorldPoint::new(max.x, max.y - r));
    arc(WorldPoint::new(max.x - r, max.y - r), 0.0, FRAC_PI_2, &mut pts);
    pts.push(WorldPoint::new(min.x + r, max.y));
    arc(WorldPoint::new(min.x + r, max.y - r), FRAC_PI_2, PI, &mut pts);
    pts.push(WorldPoint::new(min.x, min.y + r));
    arc(WorldPoint::new(min.x + r, min.y + r), PI, 1.5 * PI, &mut pts);

    pts.into_iter()
        .enumerate()
        .map(|(i, p)| Point::new(p.x, p.y, pressure, seed + i as f64).with_tilt(tilt.0, tilt.1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32, t: f64) -> Point {
        Point::new(x, y, 0.5, t)
    }

    #[test]
    fn straight_line_snaps() {
        let points: Vec<Point> = vec![
            pt(0.0, 0.0, 0.0),
            pt(20.0, 1.0, 50.0),
            pt(40.0, 0.0, 100.0),
            pt(60.0, -1.0, 150.0),
            pt(80.0, 0.0, 200.0),
            pt(80.0, 0.0, 500.0),
        ];
        let shape = classify_shape(&points).expect("expected a snap");
        match shape {
            SnapShape::Line { from, to } => {
                assert!((from.x - 0.0).abs() < 1.0);
                assert!((to.x - 80.0).abs() < 1.0);
            }
            other => panic!("expected line, got {:?}", other),
        }
    }

    #[test]
    fn circle_snaps() {
        let mut points: Vec<Point> = (0..32)
            .map(|k| {
                let angle = k as f32 * PI / 16.0;
                pt(50.0 + 30.0 * angle.cos(), 50.0 + 30.0 * angle.sin(), k as f64 * 20.0)
            })
            .collect();
        points.push(*points.last().unwrap());
        let mut still = *points.last().unwrap();
        still.timestamp += 300.0;
        points.push(still);

        let shape = classify_shape(&points).expect("expected a snap");
        match shape {
            SnapShape::Circle { radius, .. } => assert!((radius - 30.0).abs() < 3.0),
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn scratch_gesture_detected() {
        let mut points = Vec::new();
        let mut x = 20.0f32;
        let mut dir = 1.0f32;
        for i in 0..20 {
            points.push(pt(x, (i % 2) as f32 * 3.0 - 1.5, i as f64 * 16.0));
            x += dir * 6.0;
            if x > 80.0 || x < 20.0 {
                dir = -dir;
            }
        }
        assert!(detect_scratch(&points).is_some());
    }

    #[test]
    fn short_stroke_is_not_a_scratch() {
        let points: Vec<Point> = (0..5).map(|i| pt(i as f32, 0.0, i as f64 * 16.0)).collect();
        assert!(detect_scratch(&points).is_none());
    }

    #[test]
    fn scratch_detection_is_scale_invariant() {
        let base: Vec<Point> = {
            let mut points = Vec::new();
            let mut x = 20.0f32;
            let mut dir = 1.0f32;
            for i in 0..20 {
                points.push(pt(x, (i % 2) as f32 * 3.0 - 1.5, i as f64 * 16.0));
                x += dir * 6.0;
                if x > 80.0 || x < 20.0 {
                    dir = -dir;
                }
            }
            points
        };
        let scaled: Vec<Point> = base
            .iter()
            .map(|p| Point::new(p.x * 3.0, p.y * 3.0, p.pressure, p.timestamp * 3.0))
            .collect();
        assert_eq!(detect_scratch(&base).is_some(), detect_scratch(&scaled).is_some());
    }
}
