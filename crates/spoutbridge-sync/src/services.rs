//! Collaborator interfaces.
//!
//! The bridge sits between two external services: one that publishes and
//! receives named video sources, and one that drives frame timing and
//! consumes rendered streams. Both take the GPU backend by reference so
//! they can read or write pooled targets without owning them.

use spoutbridge_core::{
    AwaitOutcome, CameraResponse, ImageFrameData, Result, StreamDescriptor, StreamHandle,
};
use spoutbridge_gpu::GpuBackend;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::schema::{Schema, SchemaFile};

/// Named GPU video sources on the local machine.
pub trait VideoSourceService<B: GpuBackend> {
    /// Currently visible source names. May contain duplicates.
    fn enumerate_names(&mut self) -> Result<Vec<String>>;

    /// Receive subsequent frames from `name`.
    fn select_source(&mut self, name: &str) -> Result<()>;

    /// Geometry of the selected source, once it is known.
    fn source_geometry(&self) -> Option<(u32, u32)>;

    /// Copy the selected source's latest frame into `target`.
    /// Returns whether a new frame arrived.
    fn receive_into(&mut self, gpu: &mut B, target: &B::Target) -> Result<bool>;

    /// Publish `target` as a source called `name`.
    fn send_texture(
        &mut self,
        gpu: &mut B,
        name: &str,
        target: &B::Target,
        width: u32,
        height: u32,
    ) -> Result<()>;
}

/// The external frame-synchronization session.
pub trait FrameSyncService<B: GpuBackend> {
    /// Block until the session requests a frame, the stream set changes,
    /// or `timeout` elapses. An `Err` means the session is gone.
    fn await_frame(&mut self, timeout: Duration) -> Result<AwaitOutcome>;

    /// The authoritative stream set.
    fn stream_descriptors(&mut self) -> Result<Vec<StreamDescriptor>>;

    fn publish_schema(&mut self, schema: &Schema) -> Result<()>;

    fn persist_schema(&mut self, path: &Path, schema: &Schema) -> Result<()> {
        SchemaFile::new(schema.clone()).save_to_file(path)
    }

    /// Read a previously persisted schema. A missing file is `Ok(None)`.
    fn load_schema(&mut self, path: &Path) -> Result<Option<Schema>> {
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(SchemaFile::load_from_file(path)?.schema))
    }

    /// Current value of an image parameter on a scene.
    fn scene_parameter_image(&mut self, scene_index: u32, key: &str) -> Result<ImageFrameData>;

    /// Copy the incoming image's pixels into `target`, which already has its geometry.
    fn fetch_image(&mut self, gpu: &mut B, image: &ImageFrameData, target: &B::Target)
        -> Result<()>;

    fn send_stream_frame(
        &mut self,
        gpu: &mut B,
        handle: StreamHandle,
        target: &B::Target,
        response: &CameraResponse,
    ) -> Result<()>;
}

/// What the frame loop needs from the process hosting it.
pub trait Host<B: GpuBackend> {
    /// Polled at the top of every tick.
    fn should_stop(&self) -> bool;

    /// Show the preview target. Only called in windowed mode.
    fn present(&mut self, _gpu: &mut B, _preview: &B::Target) -> Result<()> {
        Ok(())
    }
}

/// Cooperative stop flag shared with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The underlying flag, for handlers that only take an `AtomicBool`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

impl<B: GpuBackend> Host<B> for ShutdownSignal {
    fn should_stop(&self) -> bool {
        self.is_triggered()
    }
}
