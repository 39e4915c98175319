//! JSON v1 document serialization: `exportStrokes`/`loadStrokes`.

use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use crate::grid::GridType;
use crate::stroke::Stroke;
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedDrawing {
    pub version: u32,
    #[serde(rename = "gridType")]
    pub grid_type: GridType,
    pub strokes: Vec<Stroke>,
}

/// Deep-copies the document's strokes and grid type into the wire format.
pub fn export_strokes(document: &Document) -> SerializedDrawing {
    SerializedDrawing {
        version: CURRENT_VERSION,
        grid_type: document.grid_type,
        strokes: document.strokes.clone(),
    }
}

/// Replaces the document wholesale, clearing undo/redo and selection.
/// Malformed input (unsupported version) is a no-op that preserves the
/// prior document, per the `InvalidSerialization` taxonomy entry.
pub fn load_strokes(document: &mut Document, data: SerializedDrawing) -> CoreResult<()> {
    if data.version != CURRENT_VERSION {
        return Err(CoreError::InvalidSerialization(format!(
            "unsupported version {}",
            data.version
        )));
    }
    document.clear_all();
    document.strokes = data.strokes;
    document.grid_type = data.grid_type;
    Ok(())
}

pub fn parse_json(text: &str) -> CoreResult<SerializedDrawing> {
    serde_json::from_str(text).map_err(|e| CoreError::InvalidSerialization(e.to_string()))
}

pub fn to_json(drawing: &SerializedDrawing) -> CoreResult<String> {
    serde_json::to_string(drawing).map_err(|e| CoreError::InvalidSerialization(e.to_string()))
}
