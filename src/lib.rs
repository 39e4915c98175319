//! Real-time vector ink engine: input conditioning, stroke geometry, an
//! editable document, and multimodal feedback, wired together behind a
//! single `Engine` entry point.
//!
//! The engine is deliberately host-agnostic: it owns no window, no audio
//! device, no timer. A host feeds it pointer samples and frame sizes and
//! reads back document state, render primitives, and PNG/JSON bytes.

pub mod audio;
pub mod camera;
pub mod capability;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod haptic;
pub mod input;
pub mod render;
pub mod selection;
pub mod serialize;
pub mod smoothing;
pub mod stroke;
pub mod tess;
pub mod width;

use audio::{AudioVoice, SoundProfile};
use camera::Camera;
use capability::{AudioCapability, HapticCapability, NoopAudio, NoopHaptic};
use config::EngineConfig;
use document::{Document, ResizeHandle, ToolMode};
use error::{CoreError, CoreResult};
use geometry::{Color, ScreenPoint, WorldPoint};
use grid::GridType;
use haptic::HapticPulser;
use input::{InputDispatcher, PointerEvent, PointerType, RawSample, StrokeOutcome, TouchGesture};
use serialize::SerializedDrawing;
use smoothing::FrictionParams;
use stroke::{Point, RenderConfig, Stroke};

/// Convenience alias for a headless engine with no real audio/haptic
/// backend, as used by tests and any host that hasn't wired one up yet.
pub type HeadlessEngine = Engine<NoopAudio, NoopHaptic>;

/// Transient state for a select-tool drag: lasso point list, rectangle
/// anchor, or an in-progress move of the current selection.
enum SelectDrag {
    Lasso(Vec<WorldPoint>),
    Rect(WorldPoint),
    Move { start: WorldPoint, last: WorldPoint },
    Resize {
        handle: ResizeHandle,
        pivot: WorldPoint,
        start: WorldPoint,
    },
}

/// `(sx, sy)` implied by dragging `handle` from `start` to `current` about
/// `pivot`, anchoring axes the handle doesn't control at `1.0`. Degenerate
/// (near-zero) starting spans are left at `1.0` rather than blown up by
/// division, since a handle can only sit at zero distance from its pivot
/// when the selection itself has zero width or height on that axis.
fn resize_scale_factors(handle: ResizeHandle, pivot: WorldPoint, start: WorldPoint, current: WorldPoint) -> (f32, f32) {
    let (scales_x, scales_y) = handle.axes();
    let start_dx = start.x - pivot.x;
    let start_dy = start.y - pivot.y;
    let current_dx = current.x - pivot.x;
    let current_dy = current.y - pivot.y;

    let sx = if scales_x && start_dx.abs() > 1e-3 {
        current_dx / start_dx
    } else {
        1.0
    };
    let sy = if scales_y && start_dy.abs() > 1e-3 {
        current_dy / start_dy
    } else {
        1.0
    };
    (sx, sy)
}

pub struct Engine<A: AudioCapability, H: HapticCapability> {
    pub document: Document,
    pub camera: Camera,
    pub pen: RenderConfig,
    config: EngineConfig,
    dispatcher: InputDispatcher,
    audio: AudioVoice<A>,
    haptics: HapticPulser<H>,
    friction_params: FrictionParams,
    canvas_width: f32,
    canvas_height: f32,
    select_drag: Option<SelectDrag>,
    pending_resize: Option<(f32, f32)>,
    last_tip: Option<Point>,
}

impl HeadlessEngine {
    pub fn headless(config: EngineConfig) -> Self {
        Engine::new(NoopAudio, NoopHaptic, config)
    }
}

impl<A: AudioCapability, H: HapticCapability> Engine<A, H> {
    pub fn new(audio_capability: A, haptic_capability: H, config: EngineConfig) -> Self {
        let mut document = Document::new();
        document.grid_type = config.default_grid_type;

        let mut audio = AudioVoice::new(audio_capability);
        audio.set_profile(config.sound_profile);
        audio.set_surface_texture(config.surface_texture);
        audio.set_volume(config.sound_volume);

        let mut haptics = HapticPulser::new(haptic_capability);
        haptics.set_enabled(config.haptic_enabled);

        Engine {
            document,
            camera: Camera::default(),
            pen: RenderConfig::default(),
            friction_params: FrictionParams::from_surface_texture(config.surface_texture),
            dispatcher: InputDispatcher::new(config.allow_coalesced_samples),
            audio,
            haptics,
            config,
            canvas_width: 800.0,
            canvas_height: 600.0,
            select_drag: None,
            pending_resize: None,
            last_tip: None,
        }
    }

    fn to_world(&self, x: f32, y: f32) -> WorldPoint {
        self.camera.screen_to_world(ScreenPoint::new(x, y))
    }

    // ---- drawing -------------------------------------------------

    /// `startStroke`. If a previous pen/mouse pointer was left dangling
    /// (missed pointer-up), it is committed first per the dispatcher's
    /// orphan-cleanup rule.
    ///
    /// Palm rejection: a contact reporting pressure below
    /// `EngineConfig::palm_rejection_pressure_floor` never opens a stroke
    /// at all — some digitizers report a near-zero-pressure `pen` event
    /// for a resting palm alongside the real tip contact, and this is the
    /// one signal available to tell them apart before any motion has
    /// happened.
    pub fn start_stroke(&mut self, pointer_id: u32, x: f32, y: f32, pressure: f32, tilt_x: f32, tilt_y: f32, timestamp_ms: f64) {
        if pressure < self.config.palm_rejection_pressure_floor {
            log::debug!("rejecting pointer {pointer_id} as palm contact (pressure {pressure} below floor)");
            return;
        }
        if let Some((orphaned_raw, orphaned_committed)) = self.dispatcher.start_stroke(pointer_id, self.config.raw_mode, self.friction_params, self.config.motion_prediction_enabled) {
            self.commit_active_stroke(orphaned_raw, orphaned_committed);
        }
        self.haptics.reset();
        self.last_tip = None;

        let sample = RawSample {
            pointer_id,
            pointer_type: PointerType::Pen,
            client_x: x as f64,
            client_y: y as f64,
            pressure: pressure as f64,
            tilt_x: tilt_x as f64,
            tilt_y: tilt_y as f64,
            timestamp_ms,
        };
        self.add_point_sample(sample);
        let _ = self.audio.start_stroke();
        self.haptics.trigger_immediate(timestamp_ms);
    }

    /// `addPoint`. An out-of-order timestamp is a `PointerProtocolViolation`
    /// recovered the same way as an orphaned pointer: the dangling stroke
    /// is ended and committed as-is, and the offending sample is rejected
    /// rather than fed into velocity/direction math that assumes time only
    /// moves forward.
    pub fn add_point(&mut self, pointer_id: u32, x: f32, y: f32, pressure: f32, tilt_x: f32, tilt_y: f32, timestamp_ms: f64) -> CoreResult<()> {
        if !self.dispatcher.is_drawing() {
            return Err(CoreError::PointerProtocolViolation("addPoint with no active stroke".into()));
        }
        if self.dispatcher.is_out_of_order(pointer_id, timestamp_ms) {
            log::warn!("pointer {pointer_id} sent an out-of-order addPoint timestamp ({timestamp_ms}); ending the dangling stroke");
            let raw = self.dispatcher.end_stroke_raw_points();
            if let StrokeOutcome::Commit(committed) = self.dispatcher.end_stroke() {
                self.commit_active_stroke(raw, committed);
            }
            return Err(CoreError::PointerProtocolViolation("addPoint with out-of-order timestamp".into()));
        }
        let sample = RawSample {
            pointer_id,
            pointer_type: PointerType::Pen,
            client_x: x as f64,
            client_y: y as f64,
            pressure: pressure as f64,
            tilt_x: tilt_x as f64,
            tilt_y: tilt_y as f64,
            timestamp_ms,
        };
        self.add_point_sample(sample);
        Ok(())
    }

    /// Feeds one platform event (possibly carrying coalesced sub-samples)
    /// through conditioning, triggering haptics/audio per sample.
    pub fn add_pointer_event(&mut self, event: &PointerEvent) {
        for sample in event.samples_in_order(self.dispatcher.coalesced_supported) {
            self.add_point_sample(sample);
        }
    }

    fn add_point_sample(&mut self, sample: RawSample) {
        let points = self.dispatcher.add_sample(sample, &self.camera, &self.pen);
        for point in points {
            if let Some(prev) = self.last_tip {
                let dt = (point.timestamp - prev.timestamp).max(1.0) as f32;
                let distance = point.world().dist(prev.world());
                let velocity = distance / dt * 100.0;
                self.haptics.trigger_grain(point.timestamp, distance, velocity);
                let screen = self.camera.world_to_screen(point.world());
                self.audio.on_sample(velocity / 100.0, screen.x, self.canvas_width, dt);
            }
            self.last_tip = Some(point);
        }
    }

    /// `endStroke`. Runs scratch-erase and shape-snap recognition against
    /// the raw (pre-conditioning) samples, then commits or discards the
    /// stroke. Safe to call with no active stroke. Any resize deferred
    /// during this stroke is applied once the commit completes.
    pub fn end_stroke(&mut self) {
        let raw = self.dispatcher.end_stroke_raw_points();
        if let StrokeOutcome::Commit(committed) = self.dispatcher.end_stroke() {
            self.commit_active_stroke(raw, committed);
        }
        self.audio.end_stroke(audio::ENVELOPE_RELEASE_SETTLE_MS);
        if let Some((w, h)) = self.pending_resize.take() {
            self.resize(w, h);
        }
    }

    fn commit_active_stroke(&mut self, raw: Vec<Point>, committed: Vec<Point>) {
        if raw.is_empty() {
            return;
        }

        if let Some(scratch_bounds) = gesture::detect_scratch(&raw) {
            let indices: Vec<usize> = self
                .document
                .strokes
                .iter()
                .enumerate()
                .filter(|(_, s)| s.points.iter().any(|p| scratch_bounds.contains_point(p.world())))
                .map(|(i, _)| i)
                .collect();
            self.document.delete_strokes(&indices);
            return;
        }

        let avg_pressure = raw.iter().map(|p| p.pressure).sum::<f32>() / raw.len() as f32;
        let avg_tilt = {
            let n = raw.len() as f32;
            (raw.iter().map(|p| p.tilt_x).sum::<f32>() / n, raw.iter().map(|p| p.tilt_y).sum::<f32>() / n)
        };

        let points = match gesture::classify_shape(&raw) {
            Some(shape) => {
                let seed = raw.last().map(|p| p.timestamp).unwrap_or(0.0);
                gesture::regenerate_points(shape, avg_pressure, avg_tilt, seed)
            }
            None => committed,
        };

        if points.is_empty() {
            return;
        }
        self.document.add_stroke(Stroke::new(self.pen, points));
    }

    // ---- camera ----------------------------------------------------

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.camera.pan(dx, dy);
    }

    pub fn zoom(&mut self, factor: f32, pivot_x: f32, pivot_y: f32) {
        self.camera.zoom_at(factor, ScreenPoint::new(pivot_x, pivot_y));
    }

    // ---- tool mode & selection --------------------------------------

    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        self.document.tool_mode = mode;
        self.select_drag = None;
    }

    fn stroke_half_width(stroke: &Stroke) -> f32 {
        stroke.config.base_stroke_width / 2.0
    }

    pub fn select_stroke(&mut self, x: f32, y: f32, additive: bool) {
        let p = self.to_world(x, y);
        let tolerance = 12.0 / self.camera.zoom;
        self.document.select_point(p, Self::stroke_half_width, tolerance, additive);
    }

    pub fn start_lasso(&mut self, x: f32, y: f32) {
        self.select_drag = Some(SelectDrag::Lasso(vec![self.to_world(x, y)]));
    }

    pub fn update_lasso(&mut self, x: f32, y: f32) {
        if let Some(SelectDrag::Lasso(points)) = &mut self.select_drag {
            points.push(self.to_world(x, y));
        }
    }

    pub fn end_lasso(&mut self, additive: bool) {
        if let Some(SelectDrag::Lasso(points)) = self.select_drag.take() {
            self.document.select_lasso(&points, additive);
        }
    }

    pub fn start_selection_rect(&mut self, x: f32, y: f32) {
        self.select_drag = Some(SelectDrag::Rect(self.to_world(x, y)));
    }

    pub fn update_selection_rect(&mut self, x: f32, y: f32) -> Option<geometry::Bounds> {
        if let Some(SelectDrag::Rect(anchor)) = &self.select_drag {
            let corner = self.to_world(x, y);
            return geometry::Bounds::from_points([*anchor, corner]);
        }
        None
    }

    pub fn end_selection_rect(&mut self, x: f32, y: f32, additive: bool) {
        if let Some(SelectDrag::Rect(anchor)) = self.select_drag.take() {
            let corner = self.to_world(x, y);
            if let Some(rect) = geometry::Bounds::from_points([anchor, corner]) {
                self.document.select_rect(rect, additive);
            }
        }
    }

    pub fn start_move_selected(&mut self, x: f32, y: f32) {
        let start = self.to_world(x, y);
        self.select_drag = Some(SelectDrag::Move { start, last: start });
    }

    /// Returns the live `(dx, dy)` delta for the host to preview, without
    /// committing anything to the undo log yet.
    pub fn update_move_selected(&mut self, x: f32, y: f32) -> (f32, f32) {
        let world = self.to_world(x, y);
        if let Some(SelectDrag::Move { start, last }) = &mut self.select_drag {
            let delta = (world.x - start.x, world.y - start.y);
            *last = world;
            return delta;
        }
        (0.0, 0.0)
    }

    pub fn end_move_selected(&mut self, x: f32, y: f32) {
        if let Some(SelectDrag::Move { start, .. }) = self.select_drag.take() {
            let end = self.to_world(x, y);
            self.document.end_move_selected(end.x - start.x, end.y - start.y);
        }
    }

    /// Hit-tests the current selection's resize handles against a screen
    /// point and, if one is under it, begins a resize drag. Returns the
    /// handle hit, if any, so the host can draw the right cursor/affordance.
    pub fn start_resize_handle(&mut self, x: f32, y: f32) -> Option<ResizeHandle> {
        let p = self.to_world(x, y);
        let tolerance = 12.0 / self.camera.zoom;
        let handle = self.document.hit_test_handle(p, tolerance)?;
        let bounds = self.document.selection_bounds()?;
        self.select_drag = Some(SelectDrag::Resize {
            handle,
            pivot: handle.opposite().position(&bounds),
            start: handle.position(&bounds),
        });
        Some(handle)
    }

    /// Returns the live `(sx, sy)` scale factors for the host to preview,
    /// without committing anything to the undo log yet.
    pub fn update_resize_handle(&mut self, x: f32, y: f32) -> (f32, f32) {
        let world = self.to_world(x, y);
        if let Some(SelectDrag::Resize { handle, pivot, start }) = &self.select_drag {
            return resize_scale_factors(*handle, *pivot, *start, world);
        }
        (1.0, 1.0)
    }

    pub fn end_resize_handle(&mut self, x: f32, y: f32) {
        if let Some(SelectDrag::Resize { handle, pivot, start }) = self.select_drag.take() {
            let world = self.to_world(x, y);
            let (sx, sy) = resize_scale_factors(handle, pivot, start, world);
            self.document.end_scale_selected(pivot, sx, sy);
        }
    }

    pub fn delete_selected(&mut self) {
        self.document.delete_selected();
    }

    pub fn change_selected_color(&mut self, color: Color) {
        self.document.recolor_selected(color);
    }

    pub fn clear_selection(&mut self) {
        self.document.clear_selection();
        self.select_drag = None;
    }

    // ---- undo/redo/document -----------------------------------------

    pub fn undo(&mut self) {
        self.document.undo();
    }

    pub fn redo(&mut self) {
        self.document.redo();
    }

    pub fn can_undo(&self) -> bool {
        self.document.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.can_redo()
    }

    pub fn clear_all(&mut self) {
        self.document.clear_all();
    }

    // ---- configuration -----------------------------------------------

    pub fn set_raw_mode(&mut self, raw: bool) {
        self.config.raw_mode = raw;
    }

    pub fn set_surface_texture(&mut self, t: f32) {
        self.config.surface_texture = t;
        self.friction_params = FrictionParams::from_surface_texture(t);
        self.audio.set_surface_texture(t);
    }

    pub fn set_sound_profile(&mut self, profile: SoundProfile) {
        self.config.sound_profile = profile;
        self.audio.set_profile(profile);
    }

    pub fn set_sound_volume(&mut self, volume: f32) {
        self.config.sound_volume = volume;
        self.audio.set_volume(volume);
    }

    pub fn set_haptic_enabled(&mut self, enabled: bool) {
        self.config.haptic_enabled = enabled;
        self.haptics.set_enabled(enabled);
    }

    pub fn set_grid_type(&mut self, grid: GridType) {
        self.document.grid_type = grid;
    }

    pub fn set_allow_coalesced_samples(&mut self, allow: bool) {
        self.config.allow_coalesced_samples = allow;
        self.dispatcher.coalesced_supported = allow;
    }

    // ---- export/serialization -----------------------------------------

    pub fn export_image(&self) -> CoreResult<Vec<u8>> {
        export::export_png(&self.document, &self.camera, self.canvas_width as u32, self.canvas_height as u32)
            .ok_or_else(|| CoreError::SurfaceUnavailable("could not allocate raster surface".into()))
    }

    pub fn export_strokes(&self) -> CoreResult<String> {
        serialize::to_json(&serialize::export_strokes(&self.document))
    }

    pub fn load_strokes(&mut self, json: &str) -> CoreResult<()> {
        let drawing: SerializedDrawing = serialize::parse_json(json)?;
        serialize::load_strokes(&mut self.document, drawing)
    }

    // ---- resize & touch/camera routing ---------------------------------

    /// `resize`. Deferred until `endStroke` if a stroke is in progress.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.dispatcher.is_drawing() {
            self.pending_resize = Some((width, height));
            return;
        }
        self.canvas_width = width;
        self.canvas_height = height;
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Touch never draws; one finger pans, two fingers pinch-zoom.
    ///
    /// Palm rejection: while a pen/mouse stroke is actively drawing, any
    /// touch contact is treated as an incidental palm rather than an
    /// intentional pan/zoom gesture and is ignored outright (it isn't
    /// even added to the touch-tracking set, so it can't contribute to a
    /// pinch once a second real finger lands).
    pub fn handle_touch(&mut self, phase: TouchPhase, pointer_id: u32, x: f32, y: f32) {
        if self.dispatcher.is_drawing() {
            return;
        }
        let pos = ScreenPoint::new(x, y);
        match phase {
            TouchPhase::Down => self.dispatcher.touch_down(pointer_id, pos),
            TouchPhase::Move => match self.dispatcher.touch_move(pointer_id, pos) {
                TouchGesture::Pan { dx, dy } => self.camera.pan(dx, dy),
                TouchGesture::Pinch { factor, pivot } => self.camera.zoom_at(factor, pivot),
                TouchGesture::None => {}
            },
            TouchPhase::Up | TouchPhase::Cancel => self.dispatcher.touch_up(pointer_id),
        }
    }

    /// Pointer cancel / lost capture: guarantees `endStroke` runs exactly
    /// once even though no normal pointer-up arrived.
    pub fn cancel_stroke(&mut self) {
        self.end_stroke();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

// Re-exported so downstream gesture-shape matching doesn't need a direct
// `gesture` import just for the enum variants.
pub use gesture::SnapShape as RecognizedShape;

#[cfg(test)]
mod tests {
    use super::*;
    use capability::RecordingCapability;

    fn engine() -> Engine<RecordingCapability, RecordingCapability> {
        Engine::new(RecordingCapability::default(), RecordingCapability::default(), EngineConfig::default())
    }

    #[test]
    fn draw_commits_a_stroke_and_can_be_undone() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 10.0, 0.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        e.add_point(1, 20.0, 0.0, 0.5, 0.0, 0.0, 32.0).unwrap();
        e.end_stroke();

        assert_eq!(e.document.strokes.len(), 1);
        assert!(e.can_undo());
        e.undo();
        assert_eq!(e.document.strokes.len(), 0);
    }

    #[test]
    fn orphaned_pointer_is_committed_before_new_stroke_starts() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 10.0, 0.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        // pointer 1 never got endStroke; pointer 2 starts instead.
        e.start_stroke(2, 50.0, 50.0, 0.5, 0.0, 0.0, 100.0);
        assert_eq!(e.document.strokes.len(), 1);
        e.end_stroke();
        assert_eq!(e.document.strokes.len(), 2);
    }

    #[test]
    fn low_pressure_contact_is_rejected_as_palm() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(!e.dispatcher.is_drawing());
        let err = e.add_point(1, 10.0, 0.0, 0.5, 0.0, 0.0, 16.0);
        assert!(err.is_err());
    }

    #[test]
    fn touch_is_ignored_while_pen_is_drawing() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        let before = e.camera;
        e.handle_touch(TouchPhase::Down, 99, 100.0, 100.0);
        e.handle_touch(TouchPhase::Move, 99, 120.0, 100.0);
        assert_eq!(e.camera, before);
        e.end_stroke();
    }

    #[test]
    fn add_point_without_active_stroke_is_a_protocol_violation() {
        let mut e = engine();
        let err = e.add_point(9, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        assert!(err.is_err());
    }

    #[test]
    fn out_of_order_timestamp_ends_the_dangling_stroke_and_errors() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 100.0);
        e.add_point(1, 10.0, 0.0, 0.5, 0.0, 0.0, 116.0).unwrap();
        let err = e.add_point(1, 20.0, 0.0, 0.5, 0.0, 0.0, 50.0);
        assert!(err.is_err());
        // The dangling stroke was committed rather than left open.
        assert!(!e.dispatcher.is_drawing());
        assert_eq!(e.document.strokes.len(), 1);
    }

    #[test]
    fn zoom_is_pivot_invariant_through_the_engine() {
        let mut e = engine();
        let pivot = (300.0, 200.0);
        let before = e.camera.screen_to_world(ScreenPoint::new(pivot.0, pivot.1));
        e.zoom(2.0, pivot.0, pivot.1);
        let after = e.camera.screen_to_world(ScreenPoint::new(pivot.0, pivot.1));
        assert!((before.x - after.x).abs() < 1e-4);
        assert!((before.y - after.y).abs() < 1e-4);
    }

    #[test]
    fn resize_during_a_stroke_is_deferred_until_end_stroke() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.resize(1024.0, 768.0);
        assert_eq!(e.canvas_size(), (800.0, 600.0));
        e.end_stroke();
        assert_eq!(e.canvas_size(), (1024.0, 768.0));
    }

    #[test]
    fn resize_handle_drag_scales_the_selection_and_is_undoable() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 10.0, 10.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        e.end_stroke();

        e.set_tool_mode(ToolMode::Select);
        e.start_selection_rect(-1.0, -1.0);
        e.end_selection_rect(11.0, 11.0, false);
        assert_eq!(e.document.selection.len(), 1);

        // Grab the bottom-right corner (world 10,10) and drag it to (20,20);
        // the opposite (top-left, world 0,0) corner should stay anchored.
        let hit = e.start_resize_handle(10.0, 10.0);
        assert_eq!(hit, Some(document::ResizeHandle::BottomRight));
        e.end_resize_handle(20.0, 20.0);

        let points = &e.document.strokes[0].points;
        assert!((points[0].x - 0.0).abs() < 1e-3 && (points[0].y - 0.0).abs() < 1e-3);
        assert!((points[1].x - 20.0).abs() < 1e-3 && (points[1].y - 20.0).abs() < 1e-3);

        e.undo();
        let points = &e.document.strokes[0].points;
        assert!((points[1].x - 10.0).abs() < 1e-3 && (points[1].y - 10.0).abs() < 1e-3);
    }

    #[test]
    fn start_resize_handle_misses_when_nothing_selected() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 10.0, 10.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        e.end_stroke();
        assert!(e.start_resize_handle(10.0, 10.0).is_none());
    }

    #[test]
    fn rect_and_lasso_selection_round_trip_through_the_engine() {
        let mut e = engine();
        e.set_tool_mode(ToolMode::Draw);
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 10.0, 10.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        e.end_stroke();

        e.set_tool_mode(ToolMode::Select);
        e.start_selection_rect(-5.0, -5.0);
        e.end_selection_rect(15.0, 15.0, false);
        assert_eq!(e.document.selection.len(), 1);
    }

    #[test]
    fn scratch_gesture_deletes_overlapping_strokes() {
        let mut e = engine();
        e.start_stroke(1, 20.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 60.0, 0.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        e.end_stroke();
        assert_eq!(e.document.strokes.len(), 1);

        e.set_raw_mode(true);
        e.start_stroke(2, 20.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        let mut x = 20.0f32;
        let mut dir = 1.0f32;
        let mut t = 16.0f64;
        for _ in 0..20 {
            e.add_point(2, x, (t as f32 % 3.0) - 1.5, 0.5, 0.0, 0.0, t).unwrap();
            x += dir * 6.0;
            if x > 80.0 || x < 20.0 {
                dir = -dir;
            }
            t += 16.0;
        }
        e.end_stroke();
        assert_eq!(e.document.strokes.len(), 0);
    }

    #[test]
    fn export_strokes_round_trips_through_load_strokes() {
        let mut e = engine();
        e.start_stroke(1, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0);
        e.add_point(1, 10.0, 0.0, 0.5, 0.0, 0.0, 16.0).unwrap();
        e.end_stroke();

        let json = e.export_strokes().unwrap();
        let mut other = engine();
        other.load_strokes(&json).unwrap();
        assert_eq!(other.document.strokes.len(), e.document.strokes.len());
    }
}
