//! Error taxonomy for the ink core. Nothing here is fatal: every variant
//! names a degraded-but-still-running state rather than a reason to abort.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("audio synth unavailable: {0}")]
    AudioUnavailable(String),

    #[error("haptic pulser unavailable: {0}")]
    HapticUnavailable(String),

    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("pointer protocol violation: {0}")]
    PointerProtocolViolation(String),

    #[error("invalid serialized drawing: {0}")]
    InvalidSerialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
