//! Error types for SpoutBridge.

use thiserror::Error;

use crate::format::PixelFormat;
use crate::stream::StreamHandle;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A GPU call failed. Context state is suspect afterwards; the session must end.
    #[error("GPU error: {0}")]
    FatalGpu(String),

    #[error("Invalid geometry: {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    #[error("Scene index {index} out of bounds (schema has {scene_count} scenes)")]
    StaleSceneIndex { index: u32, scene_count: usize },

    #[error("No camera data for stream {0}")]
    CameraUnavailable(StreamHandle),

    /// A collaborating service (video sources or frame sync) rejected a call.
    #[error("Service error: {0}")]
    Service(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether this error must terminate the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalGpu(_))
    }

    /// Whether this error only rejects a single allocation or copy request.
    pub fn is_request_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry { .. } | Self::UnsupportedFormat(_)
        )
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
