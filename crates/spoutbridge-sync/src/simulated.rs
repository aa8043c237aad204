//! In-process stand-ins for the external services.
//!
//! These let the bridge run headless without either vendor SDK. Sources
//! render a solid color derived from their name; the session announces its
//! streams once and then requests frames at a fixed rate.

use glam::{Vec2, Vec3};
use spoutbridge_core::{
    AwaitOutcome, BridgeError, CameraData, CameraResponse, FrameEvent, ImageFrameData, ImageId,
    PixelFormat, Result, StreamDescriptor, StreamHandle,
};
use spoutbridge_gpu::GpuBackend;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::schema::Schema;
use crate::services::{FrameSyncService, VideoSourceService};

/// Stable RGBA color for a name (FNV-1a).
pub fn color_for(name: &str) -> [f64; 4] {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let channel = |shift: u32| f64::from(((hash >> shift) & 0xff) as u8) / 255.0;
    [channel(0), channel(8), channel(16), 1.0]
}

/// A fixed set of named sources sharing one geometry.
#[derive(Debug, Clone)]
pub struct SimulatedSources {
    names: Vec<String>,
    geometry: (u32, u32),
    selected: Option<String>,
    sent: Vec<String>,
}

impl SimulatedSources {
    pub fn new(names: Vec<String>, width: u32, height: u32) -> Self {
        Self {
            names,
            geometry: (width, height),
            selected: None,
            sent: Vec::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.names.retain(|n| n != name);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Names of every texture published through `send_texture`, in order.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

impl<B: GpuBackend> VideoSourceService<B> for SimulatedSources {
    fn enumerate_names(&mut self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }

    fn select_source(&mut self, name: &str) -> Result<()> {
        if !self.names.iter().any(|n| n == name) {
            return Err(BridgeError::Service(format!("no source named '{}'", name)));
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    fn source_geometry(&self) -> Option<(u32, u32)> {
        self.selected.as_ref().map(|_| self.geometry)
    }

    fn receive_into(&mut self, gpu: &mut B, target: &B::Target) -> Result<bool> {
        let Some(name) = &self.selected else {
            return Ok(false);
        };
        if !self.names.contains(name) {
            return Ok(false);
        }
        gpu.fill(target, color_for(name))?;
        Ok(true)
    }

    fn send_texture(
        &mut self,
        _gpu: &mut B,
        name: &str,
        _target: &B::Target,
        width: u32,
        height: u32,
    ) -> Result<()> {
        trace!(sender = %name, width, height, "Texture sent");
        self.sent.push(name.to_string());
        Ok(())
    }
}

/// A frame-sync session that paces frames on a timer.
#[derive(Debug)]
pub struct SimulatedSession {
    streams: Vec<StreamDescriptor>,
    frame_interval: Duration,
    announced: bool,
    epoch: Instant,
    last_frame: Option<Instant>,
    frame_count: u64,
    published: Option<Schema>,
    frames_sent: u64,
}

impl SimulatedSession {
    pub fn new(streams: Vec<StreamDescriptor>, fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(BridgeError::Config(format!(
                "frame rate must be positive, got {}",
                fps
            )));
        }
        Ok(Self {
            streams,
            frame_interval: Duration::from_secs_f64(1.0 / fps),
            announced: false,
            epoch: Instant::now(),
            last_frame: None,
            frame_count: 0,
            published: None,
            frames_sent: 0,
        })
    }

    /// Replace the stream set; the next await reports the change.
    pub fn set_streams(&mut self, streams: Vec<StreamDescriptor>) {
        self.streams = streams;
        self.announced = false;
    }

    pub fn published(&self) -> Option<&Schema> {
        self.published.as_ref()
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    fn scene_count(&self) -> usize {
        self.published.as_ref().map_or(0, Schema::scene_count)
    }

    fn camera_for(handle: StreamHandle, t: f32) -> CameraData {
        CameraData {
            id: handle.0,
            position: Vec3::new(t.sin() * 2.0, 1.7, -5.0),
            rotation: Vec3::new(0.0, t.cos() * 15.0, 0.0),
            sensor_size: Vec2::new(36.0, 20.25),
            ..Default::default()
        }
    }
}

impl<B: GpuBackend> FrameSyncService<B> for SimulatedSession {
    fn await_frame(&mut self, timeout: Duration) -> Result<AwaitOutcome> {
        if !self.announced {
            self.announced = true;
            return Ok(AwaitOutcome::StreamsChanged);
        }

        let scene_count = self.scene_count();
        if scene_count == 0 {
            std::thread::sleep(timeout.min(self.frame_interval));
            return Ok(AwaitOutcome::Timeout);
        }

        let now = Instant::now();
        let due = self.last_frame.map_or(now, |last| last + self.frame_interval);
        let wait = due.saturating_duration_since(now);
        if wait > timeout {
            std::thread::sleep(timeout);
            return Ok(AwaitOutcome::Timeout);
        }
        std::thread::sleep(wait);
        self.last_frame = Some(Instant::now());

        let timestamp = self.epoch.elapsed().as_secs_f64();
        let scene_index = (self.frame_count % scene_count as u64) as u32;
        self.frame_count += 1;

        let event = self
            .streams
            .iter()
            .fold(FrameEvent::new(timestamp, scene_index), |event, stream| {
                event.with_camera(stream.handle, Self::camera_for(stream.handle, timestamp as f32))
            });
        Ok(AwaitOutcome::Frame(event))
    }

    fn stream_descriptors(&mut self) -> Result<Vec<StreamDescriptor>> {
        Ok(self.streams.clone())
    }

    fn publish_schema(&mut self, schema: &Schema) -> Result<()> {
        debug!(scenes = schema.scene_count(), "Session accepted schema");
        self.published = Some(schema.clone());
        Ok(())
    }

    fn scene_parameter_image(&mut self, scene_index: u32, key: &str) -> Result<ImageFrameData> {
        let schema = self
            .published
            .as_ref()
            .ok_or_else(|| BridgeError::Service("no schema published".to_string()))?;
        let scene = schema.scene(scene_index)?;
        if scene.parameter(key).is_none() {
            return Err(BridgeError::Service(format!(
                "scene '{}' has no parameter '{}'",
                scene.name, key
            )));
        }

        Ok(ImageFrameData {
            image_id: ImageId(u64::from(scene_index)),
            width: 1280,
            height: 720,
            format: PixelFormat::Rgba8,
        })
    }

    fn fetch_image(&mut self, gpu: &mut B, image: &ImageFrameData, target: &B::Target) -> Result<()> {
        gpu.fill(target, color_for(&format!("image-{}", image.image_id.0)))
    }

    fn send_stream_frame(
        &mut self,
        _gpu: &mut B,
        handle: StreamHandle,
        _target: &B::Target,
        response: &CameraResponse,
    ) -> Result<()> {
        trace!(%handle, t_tracked = response.t_tracked, "Stream frame received");
        self.frames_sent += 1;
        Ok(())
    }
}
