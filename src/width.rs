//! Stroke width model: pressure x velocity x tilt -> clamped width, with
//! end-to-end taper.

use crate::geometry::clamp;
use crate::stroke::Point;

pub const DOT_TAPER_FACTOR: f32 = 0.4;

/// Per-segment width given the point at the end of the segment and the
/// point before it. `velocity` is `|delta position| / delta time (ms)`.
pub fn segment_width(
    base_width: f32,
    min_width: f32,
    max_width: f32,
    pressure_influence: f32,
    velocity_influence: f32,
    current: Point,
    previous: Point,
) -> f32 {
    let p_factor = pressure_influence * current.pressure + (1.0 - pressure_influence) * 0.5;

    let dt = (current.timestamp - previous.timestamp).max(1.0) as f32;
    let dx = current.x - previous.x;
    let dy = current.y - previous.y;
    let v = dx.hypot(dy) / dt;
    let v_factor = 1.0 - (v / 2.5).min(1.0) * velocity_influence;

    let mut w = base_width * p_factor * v_factor;

    let tilt_mag = current.tilt_x.hypot(current.tilt_y);
    if tilt_mag > 0.0 {
        let tilt_dir = current.tilt_y.atan2(current.tilt_x);
        let stroke_dir = dy.atan2(dx);
        let theta = (tilt_dir - stroke_dir).abs() % std::f32::consts::TAU;
        let theta = theta.min(std::f32::consts::TAU - theta);
        let n = theta.min(std::f32::consts::PI - theta) / std::f32::consts::FRAC_PI_2;
        let m = (tilt_mag / 60.0).min(1.0);
        w *= 1.0 + (0.6 + 0.9 * n - 1.0) * m;
    }

    clamp(w, min_width, max_width)
}

/// Width for a single-point (dot) stroke: same pressure/velocity model
/// with no motion (velocity 0), scaled by the dot-taper factor.
pub fn dot_width(
    base_width: f32,
    min_width: f32,
    max_width: f32,
    pressure_influence: f32,
    point: Point,
) -> f32 {
    let p_factor = pressure_influence * point.pressure + (1.0 - pressure_influence) * 0.5;
    let w = clamp(base_width * p_factor, min_width, max_width);
    w * DOT_TAPER_FACTOR
}

/// Number of segments at each end of the stroke that receive the
/// quadratic taper ramp.
pub fn taper_segment_count(n_points: usize) -> usize {
    (0.15 * n_points as f32).floor().min(8.0) as usize
}

/// Applies the entry/exit taper in place to a list of per-segment widths
/// (length = n_points - 1).
pub fn apply_taper(widths: &mut [f32], n_points: usize) {
    if n_points < 4 || widths.is_empty() {
        return;
    }
    let t = taper_segment_count(n_points);
    if t == 0 {
        return;
    }
    let n = widths.len();
    for k in 0..t.min(n) {
        let ramp = ((k + 1) as f32 / (t + 1) as f32).powi(2);
        widths[k] *= ramp;
    }
    for k in 0..t.min(n) {
        let idx = n - 1 - k;
        let ramp = ((k + 1) as f32 / (t + 1) as f32).powi(2);
        widths[idx] *= ramp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32, t: f64, pressure: f32) -> Point {
        Point::new(x, y, pressure, t)
    }

    #[test]
    fn width_respects_clamp() {
        let w = segment_width(4.0, 1.0, 6.0, 1.0, 1.0, pt(100.0, 0.0, 10.0, 1.0), pt(0.0, 0.0, 0.0, 1.0));
        assert!(w >= 1.0 && w <= 6.0);
    }

    #[test]
    fn zero_tilt_leaves_width_unchanged_by_tilt_term() {
        let a = segment_width(4.0, 1.0, 20.0, 0.5, 0.5, pt(1.0, 0.0, 10.0, 0.5), pt(0.0, 0.0, 0.0, 0.5));
        let mut b_point = pt(1.0, 0.0, 10.0, 0.5);
        b_point.tilt_x = 0.0;
        b_point.tilt_y = 0.0;
        let b = segment_width(4.0, 1.0, 20.0, 0.5, 0.5, b_point, pt(0.0, 0.0, 0.0, 0.5));
        assert_eq!(a, b);
    }

    #[test]
    fn taper_shrinks_tip_segments() {
        let mut widths = vec![4.0; 10];
        apply_taper(&mut widths, 11);
        assert!(widths[0] < 4.0);
        assert!(widths[9] < 4.0);
        assert!(widths[5] == 4.0);
    }

    #[test]
    fn taper_skipped_for_short_strokes() {
        let mut widths = vec![4.0; 2];
        apply_taper(&mut widths, 3);
        assert_eq!(widths, vec![4.0, 4.0]);
    }
}
