//! Per-tick frame data produced by the frame-sync session.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BridgeError, Result};
use crate::format::PixelFormat;
use crate::stream::StreamHandle;

/// Tracked camera for one stream at the time of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    pub id: u64,
    /// World-space position in metres.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Focal length in millimetres.
    pub focal_length: f32,
    /// Sensor size in millimetres.
    pub sensor_size: Vec2,
    /// Principal point offset, normalized.
    pub principal_point: Vec2,
    pub near_z: f32,
    pub far_z: f32,
    /// Orthographic width; zero for perspective cameras.
    pub ortho_width: f32,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            id: 0,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            focal_length: 35.0,
            sensor_size: Vec2::new(36.0, 24.0),
            principal_point: Vec2::ZERO,
            near_z: 0.1,
            far_z: 1000.0,
            ortho_width: 0.0,
        }
    }
}

/// One successful await: which scene to render and the cameras to render it with.
///
/// Consumed within the tick that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameEvent {
    /// Tracked timestamp in seconds.
    pub timestamp: f64,
    /// Index into the published schema's scene list.
    pub scene_index: u32,
    pub cameras: HashMap<StreamHandle, CameraData>,
}

impl FrameEvent {
    pub fn new(timestamp: f64, scene_index: u32) -> Self {
        Self {
            timestamp,
            scene_index,
            cameras: HashMap::new(),
        }
    }

    pub fn with_camera(mut self, handle: StreamHandle, camera: CameraData) -> Self {
        self.cameras.insert(handle, camera);
        self
    }

    pub fn camera(&self, handle: StreamHandle) -> Result<&CameraData> {
        self.cameras
            .get(&handle)
            .ok_or(BridgeError::CameraUnavailable(handle))
    }

    /// Response metadata forwarded with the frame sent for `handle`.
    ///
    /// A missing camera degrades to a timestamp-only response.
    pub fn response_for(&self, handle: StreamHandle) -> CameraResponse {
        CameraResponse {
            t_tracked: self.timestamp,
            camera: self.camera(handle).ok().copied(),
        }
    }
}

/// Metadata attached to each frame sent back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraResponse {
    pub t_tracked: f64,
    pub camera: Option<CameraData>,
}

/// Result of one blocking await-frame call.
#[derive(Debug, Clone, PartialEq)]
pub enum AwaitOutcome {
    /// No frame request arrived before the timeout.
    Timeout,
    /// The session replaced its stream set; descriptors must be re-fetched.
    StreamsChanged,
    Frame(FrameEvent),
}

/// Session-side identifier of an incoming image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

/// Current value of an image parameter for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrameData {
    pub image_id: ImageId,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}
