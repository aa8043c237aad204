//! SpoutBridge Core - Foundation types for the stream bridge
//!
//! This crate provides the types shared by the GPU layer and the
//! frame-synchronization loop:
//! - Error taxonomy (fatal GPU failures vs. per-tick degradations)
//! - Pixel formats understood by the external session
//! - Stream handles, descriptors and copy regions
//! - Frame events, camera metadata and incoming image descriptors

pub mod error;
pub mod format;
pub mod frame;
pub mod stream;

pub use error::{BridgeError, Result};
pub use format::PixelFormat;
pub use frame::{AwaitOutcome, CameraData, CameraResponse, FrameEvent, ImageFrameData, ImageId};
pub use stream::{validate_geometry, Region, StreamDescriptor, StreamHandle};

/// Defaults shared by the bridge crates.
pub mod defaults {
    use std::time::Duration;

    /// How long a single await-frame call may block.
    pub const AWAIT_TIMEOUT: Duration = Duration::from_millis(5000);

    /// Initial geometry of the local source target, before any source reports its size.
    pub const SOURCE_TARGET_SIZE: (u32, u32) = (1280, 720);

    /// Geometry of the windowed preview target.
    pub const PREVIEW_SIZE: (u32, u32) = (1280, 720);

    /// Name under which incoming images are re-published as a video source.
    pub const OUTGOING_SENDER_NAME: &str = "RenderStream";

    /// Parameter key of the incoming image declared on every scene.
    pub const INPUT_PARAMETER_KEY: &str = "spout_input";
}
