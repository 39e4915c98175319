//! 2x-oversampled raster export of the current visible view.

use crate::camera::Camera;
use crate::document::Document;
use crate::render::{redraw, RasterTarget};

pub const EXPORT_SCALE: f32 = 2.0;
pub const PAPER_COLOR: [u8; 3] = [0xf9, 0xf9, 0xf9];

/// Renders the visible `width x height` view at `EXPORT_SCALE`x and
/// returns encoded PNG bytes. Returns `None` (mapped by the caller to
/// `SurfaceUnavailable` / empty bytes) if the raster surface can't be
/// allocated.
pub fn export_png(document: &Document, camera: &Camera, width: u32, height: u32) -> Option<Vec<u8>> {
    let scaled_width = (width as f32 * EXPORT_SCALE) as u32;
    let scaled_height = (height as f32 * EXPORT_SCALE) as u32;
    let mut target = RasterTarget::new(scaled_width, scaled_height)?;

    let mut export_camera = *camera;
    export_camera.zoom *= EXPORT_SCALE;

    redraw(&mut target, document, &export_camera, scaled_width as f32, scaled_height as f32, PAPER_COLOR);
    target.into_png_bytes()
}
