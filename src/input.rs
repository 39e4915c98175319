//! Input dispatcher: pointer-type routing, palm rejection, coalesced
//! sample handling, and the capture guarantee that `endStroke` fires
//! exactly once per `startStroke`.

use crate::camera::Camera;
use crate::geometry::ScreenPoint;
use crate::smoothing::{FrictionFilter, FrictionParams, MotionPredictor, StreamlineSmoother};
use crate::stroke::{Point, RenderConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Pen,
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub pointer_id: u32,
    pub pointer_type: PointerType,
    pub client_x: f64,
    pub client_y: f64,
    pub pressure: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub timestamp_ms: f64,
}

/// A pointer event plus any sub-frame samples the platform coalesced
/// into it, oldest first, leaf last.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub leaf: RawSample,
    pub coalesced: Vec<RawSample>,
}

impl PointerEvent {
    pub fn single(sample: RawSample) -> Self {
        PointerEvent {
            leaf: sample,
            coalesced: vec![],
        }
    }

    /// Every sample this event should feed through the pipeline, in
    /// order. Falls back to just the leaf sample when the platform
    /// capability says coalesced sub-samples aren't trustworthy.
    pub fn samples_in_order(&self, coalesced_supported: bool) -> Vec<RawSample> {
        if coalesced_supported && !self.coalesced.is_empty() {
            let mut samples = self.coalesced.clone();
            samples.push(self.leaf);
            samples
        } else {
            vec![self.leaf]
        }
    }
}

fn raw_sample_to_point(sample: RawSample, camera: &Camera) -> Point {
    let world = camera.screen_to_world(ScreenPoint::new(sample.client_x as f32, sample.client_y as f32));
    Point::new(world.x, world.y, sample.pressure as f32, sample.timestamp_ms)
        .with_tilt(sample.tilt_x as f32, sample.tilt_y as f32)
}

/// State for the one pen/mouse pointer currently drawing. Only one may
/// be active at a time; a new pen-down while this exists means the
/// previous pointer was orphaned (missed pointer-up) and must be ended
/// first.
pub struct ActiveStroke {
    pub pointer_id: u32,
    pub raw_mode: bool,
    /// Pre-friction/pre-smoothing samples, in world space. This is what
    /// the gesture recognizer sees.
    pub raw_points: Vec<Point>,
    /// Post-conditioning samples: what actually gets committed as the
    /// stroke's geometry absent a gesture snap/erase.
    pub committed_points: Vec<Point>,
    friction: FrictionFilter,
    streamline: StreamlineSmoother,
    predictor: MotionPredictor,
}

impl ActiveStroke {
    fn new(pointer_id: u32, raw_mode: bool, friction_params: FrictionParams, predictor_enabled: bool) -> Self {
        let mut predictor = MotionPredictor::default();
        predictor.set_enabled(predictor_enabled);
        ActiveStroke {
            pointer_id,
            raw_mode,
            raw_points: Vec::new(),
            committed_points: Vec::new(),
            friction: FrictionFilter::new(friction_params),
            streamline: StreamlineSmoother::default(),
            predictor,
        }
    }

    fn last_committed(&self) -> Option<Point> {
        self.committed_points.last().copied()
    }

    /// Conditions one world-space sample and appends it to both the raw
    /// and committed point lists. Returns the conditioned point (the one
    /// to draw as the incremental tip).
    fn ingest(&mut self, raw_world: Point, streamline: f32, pressure_influence: f32) -> Point {
        self.raw_points.push(raw_world);

        if self.raw_mode {
            self.committed_points.push(raw_world);
            return raw_world;
        }

        let velocity = match self.last_committed() {
            Some(prev) => {
                let dt = (raw_world.timestamp - prev.timestamp).max(1.0) as f32;
                raw_world.world().dist(prev.world()) / dt * 100.0
            }
            None => 0.0,
        };
        let direction = match self.last_committed() {
            Some(prev) => (raw_world.y - prev.y).atan2(raw_world.x - prev.x),
            None => 0.0,
        };

        let friction_out = self
            .friction
            .apply(raw_world.world(), raw_world.pressure * pressure_influence, velocity, direction);
        let smoothed = self.streamline.apply(friction_out.point, streamline);
        let predicted = self.predictor.predict(smoothed, raw_world.timestamp);

        let mut conditioned = raw_world;
        conditioned.x = predicted.x;
        conditioned.y = predicted.y;
        self.committed_points.push(conditioned);
        conditioned
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchTrack {
    pub pointer_id: u32,
    pub last: ScreenPoint,
}

/// Coordinates the pen/mouse draw-or-select pointer and the touch
/// multi-set used for pan/pinch-zoom. Touch pointers never draw.
pub struct InputDispatcher {
    pub coalesced_supported: bool,
    active_draw: Option<ActiveStroke>,
    touches: Vec<TouchTrack>,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        InputDispatcher {
            coalesced_supported: true,
            active_draw: None,
            touches: Vec::new(),
        }
    }
}

pub enum StrokeOutcome {
    /// No active stroke to end.
    None,
    /// Regular commit: use these committed points to build the Stroke.
    Commit(Vec<Point>),
}

impl InputDispatcher {
    pub fn new(coalesced_supported: bool) -> Self {
        InputDispatcher {
            coalesced_supported,
            ..Default::default()
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.active_draw.is_some()
    }

    pub fn active_raw_points(&self) -> &[Point] {
        self.active_draw.as_ref().map(|s| s.raw_points.as_slice()).unwrap_or(&[])
    }

    /// Starts a new draw/select pointer. If an old pointer is still
    /// active (orphaned pen-down), ends it first and returns its
    /// `(raw, committed)` points so the caller can still run gesture
    /// recognition and commit that stroke before starting the new one —
    /// this is the `PointerProtocolViolation` recovery path.
    pub fn start_stroke(
        &mut self,
        pointer_id: u32,
        raw_mode: bool,
        friction_params: FrictionParams,
        predictor_enabled: bool,
    ) -> Option<(Vec<Point>, Vec<Point>)> {
        let orphaned = self.active_draw.take().map(|s| (s.raw_points, s.committed_points));
        self.active_draw = Some(ActiveStroke::new(pointer_id, raw_mode, friction_params, predictor_enabled));
        orphaned
    }

    /// True if `timestamp_ms` would regress the active stroke for
    /// `pointer_id` — a `PointerProtocolViolation` the caller should
    /// recover from the same way as an orphaned pointer: end the
    /// dangling stroke rather than feed it a sample that would make
    /// velocity/direction math go backwards.
    pub fn is_out_of_order(&self, pointer_id: u32, timestamp_ms: f64) -> bool {
        match &self.active_draw {
            Some(stroke) if stroke.pointer_id == pointer_id => stroke
                .raw_points
                .last()
                .map(|p| timestamp_ms < p.timestamp)
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn add_sample(&mut self, sample: RawSample, camera: &Camera, cfg: &RenderConfig) -> Vec<Point> {
        let Some(stroke) = self.active_draw.as_mut() else {
            return vec![];
        };
        if sample.pointer_id != stroke.pointer_id {
            return vec![];
        }
        let point = raw_sample_to_point(sample, camera);
        vec![stroke.ingest(point, cfg.streamline, cfg.pressure_influence)]
    }

    pub fn add_event(&mut self, event: &PointerEvent, camera: &Camera, cfg: &RenderConfig) -> Vec<Point> {
        let supported = self.coalesced_supported;
        event
            .samples_in_order(supported)
            .into_iter()
            .flat_map(|s| self.add_sample(s, camera, cfg))
            .collect()
    }

    /// Ends the active stroke, guaranteeing exactly-once semantics: safe
    /// to call on normal pointer-up, cancel, leave, or lost capture.
    pub fn end_stroke(&mut self) -> StrokeOutcome {
        match self.active_draw.take() {
            Some(stroke) => StrokeOutcome::Commit(stroke.committed_points),
            None => StrokeOutcome::None,
        }
    }

    pub fn end_stroke_raw_points(&self) -> Vec<Point> {
        self.active_draw.as_ref().map(|s| s.raw_points.clone()).unwrap_or_default()
    }

    pub fn touch_down(&mut self, pointer_id: u32, pos: ScreenPoint) {
        self.touches.retain(|t| t.pointer_id != pointer_id);
        self.touches.push(TouchTrack { pointer_id, last: pos });
    }

    pub fn touch_up(&mut self, pointer_id: u32) {
        self.touches.retain(|t| t.pointer_id != pointer_id);
    }

    /// Returns a screen-space pan delta for a single-finger drag, or a
    /// pinch `(factor, pivot)` for two fingers, updating internal
    /// tracking as it goes.
    pub fn touch_move(&mut self, pointer_id: u32, pos: ScreenPoint) -> TouchGesture {
        let count = self.touches.len();
        let prev = self.touches.iter().find(|t| t.pointer_id == pointer_id).map(|t| t.last);

        let gesture = match (count, prev) {
            (1, Some(prev)) => TouchGesture::Pan {
                dx: pos.x - prev.x,
                dy: pos.y - prev.y,
            },
            (2, Some(before)) => {
                if let Some(other) = self.touches.iter().find(|t| t.pointer_id != pointer_id).copied() {
                    let d_before = (before.x - other.last.x).hypot(before.y - other.last.y);
                    let d_after = (pos.x - other.last.x).hypot(pos.y - other.last.y);
                    let factor = if d_before > 1e-3 { d_after / d_before } else { 1.0 };
                    let pivot = ScreenPoint::new((pos.x + other.last.x) / 2.0, (pos.y + other.last.y) / 2.0);
                    TouchGesture::Pinch { factor, pivot }
                } else {
                    TouchGesture::None
                }
            }
            _ => TouchGesture::None,
        };

        if let Some(t) = self.touches.iter_mut().find(|t| t.pointer_id == pointer_id) {
            t.last = pos;
        }

        gesture
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchGesture {
    None,
    Pan { dx: f32, dy: f32 },
    Pinch { factor: f32, pivot: ScreenPoint },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::RenderConfig;

    fn sample(pointer_id: u32, x: f64, y: f64, t: f64) -> RawSample {
        RawSample {
            pointer_id,
            pointer_type: PointerType::Pen,
            client_x: x,
            client_y: y,
            pressure: 0.5,
            tilt_x: 0.0,
            tilt_y: 0.0,
            timestamp_ms: t,
        }
    }

    #[test]
    fn orphaned_pointer_is_ended_before_new_one_starts() {
        let mut d = InputDispatcher::new(true);
        d.start_stroke(1, true, FrictionParams::default(), false);
        d.add_sample(sample(1, 0.0, 0.0, 0.0), &Camera::default(), &RenderConfig::default());
        let orphaned = d.start_stroke(2, true, FrictionParams::default(), false);
        assert!(orphaned.is_some());
        let (raw, committed) = orphaned.unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(committed.len(), 1);
    }

    #[test]
    fn end_stroke_is_safe_to_call_with_no_active_stroke() {
        let mut d = InputDispatcher::new(true);
        assert!(matches!(d.end_stroke(), StrokeOutcome::None));
    }

    #[test]
    fn raw_mode_passes_samples_through_unchanged() {
        let mut d = InputDispatcher::new(true);
        d.start_stroke(1, true, FrictionParams::default(), false);
        let out = d.add_sample(sample(1, 10.0, 20.0, 0.0), &Camera::default(), &RenderConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].x, 10.0);
        assert_eq!(out[0].y, 20.0);
    }

    #[test]
    fn coalesced_samples_processed_in_order() {
        let mut d = InputDispatcher::new(true);
        d.start_stroke(1, true, FrictionParams::default(), false);
        let event = PointerEvent {
            leaf: sample(1, 10.0, 0.0, 20.0),
            coalesced: vec![sample(1, 5.0, 0.0, 10.0)],
        };
        let out = d.add_event(&event, &Camera::default(), &RenderConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].x, 5.0);
        assert_eq!(out[1].x, 10.0);
    }

    #[test]
    fn out_of_order_timestamp_is_detected_for_the_active_pointer() {
        let mut d = InputDispatcher::new(true);
        d.start_stroke(1, true, FrictionParams::default(), false);
        d.add_sample(sample(1, 0.0, 0.0, 100.0), &Camera::default(), &RenderConfig::default());
        assert!(d.is_out_of_order(1, 50.0));
        assert!(!d.is_out_of_order(1, 150.0));
        // A different, not-yet-active pointer never regresses anything.
        assert!(!d.is_out_of_order(2, 0.0));
    }

    #[test]
    fn unsupported_coalesced_capability_uses_only_leaf() {
        let mut d = InputDispatcher::new(false);
        d.start_stroke(1, true, FrictionParams::default(), false);
        let event = PointerEvent {
            leaf: sample(1, 10.0, 0.0, 20.0),
            coalesced: vec![sample(1, 5.0, 0.0, 10.0)],
        };
        let out = d.add_event(&event, &Camera::default(), &RenderConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].x, 10.0);
    }
}
