//! The frame-synchronization loop.
//!
//! One tick runs on the calling thread from start to finish:
//!
//! 1. poll the host's stop flag
//! 2. with outputs enabled, fold the current source list into the schema and
//!    receive the selected source into the local source target
//! 3. in windowed mode, present a flipped preview of the source target
//! 4. block on the session's await-frame call
//! 5. reconcile stream targets, skip, or dispatch depending on the outcome
//!
//! Only `FatalGpu` errors and a failed await leave the loop; everything else
//! degrades within the tick.

use spoutbridge_core::defaults::{
    INPUT_PARAMETER_KEY, OUTGOING_SENDER_NAME, PREVIEW_SIZE, SOURCE_TARGET_SIZE,
};
use spoutbridge_core::{
    AwaitOutcome, BridgeError, FrameEvent, PixelFormat, Result, StreamDescriptor, StreamHandle,
};
use spoutbridge_gpu::{Flip, GpuBackend, RenderSurface, RenderTargetPool, TargetSlot};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::schema::{self, Schema, SchemaBuilder, DEFAULT_SCENE};
use crate::services::{FrameSyncService, Host, VideoSourceService};
use crate::sources::SourceRegistry;

/// Format of the local source target.
const SOURCE_FORMAT: PixelFormat = PixelFormat::Rgba32F;
/// Format of the preview target.
const PREVIEW_FORMAT: PixelFormat = PixelFormat::Rgba8;

/// Where the loop is within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Awaiting,
    Reconciling,
    Dispatching,
    TimedOut,
}

/// Why a frame was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    StaleSceneIndex { index: u32, scene_count: usize },
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The host asked the loop to stop. Nothing else ran.
    Stopped,
    TimedOut,
    /// The stream set was replaced. No frame was dispatched.
    Reconciled {
        streams: usize,
        evicted: Vec<StreamHandle>,
    },
    Dispatched {
        frames_sent: usize,
        input_forwarded: bool,
    },
    Skipped(SkipReason),
}

/// Counters over the loop's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub timeouts: u64,
    pub reconciliations: u64,
    pub frames_dispatched: u64,
    pub frames_sent: u64,
    pub frames_received: u64,
    pub inputs_forwarded: u64,
    pub stale_frames: u64,
    pub schema_publications: u64,
}

/// Log and drop a non-fatal error. Fatal errors are returned.
fn tolerate<T>(result: Result<T>, what: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(error = %e, "{}", what);
            Ok(None)
        }
    }
}

/// Drives one bridge session against a GPU backend and two collaborators.
pub struct FrameSyncLoop<B, V, F>
where
    B: GpuBackend,
    V: VideoSourceService<B>,
    F: FrameSyncService<B>,
{
    config: BridgeConfig,
    schema_path: PathBuf,
    gpu: B,
    video: V,
    sync: F,
    pool: RenderTargetPool<B>,
    sources: SourceRegistry,
    builder: SchemaBuilder,
    /// Last schema the session accepted.
    schema: Schema,
    /// Set when the tracked sources changed but the session has not accepted a rebuild.
    schema_dirty: bool,
    streams: Vec<StreamDescriptor>,
    selected_source: Option<String>,
    state: LoopState,
    stats: LoopStats,
    started: bool,
}

impl<B, V, F> FrameSyncLoop<B, V, F>
where
    B: GpuBackend,
    V: VideoSourceService<B>,
    F: FrameSyncService<B>,
{
    pub fn new(config: BridgeConfig, gpu: B, video: V, sync: F) -> Result<Self> {
        config.validate()?;
        let schema_path = config.resolve_schema_path()?;

        Ok(Self {
            sources: SourceRegistry::new(config.remove_sender_names),
            builder: SchemaBuilder::new(config.enable_input),
            config,
            schema_path,
            gpu,
            video,
            sync,
            pool: RenderTargetPool::new(),
            schema: Schema::default(),
            schema_dirty: false,
            streams: Vec::new(),
            selected_source: None,
            state: LoopState::Idle,
            stats: LoopStats::default(),
            started: false,
        })
    }

    /// Allocate the fixed targets and bring the session's schema up to date.
    ///
    /// Called by the first `tick` when not called explicitly.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }

        let (width, height) = SOURCE_TARGET_SIZE;
        self.pool
            .ensure(&mut self.gpu, TargetSlot::Source, width, height, SOURCE_FORMAT)?;

        if self.config.windowed {
            let (width, height) = PREVIEW_SIZE;
            self.pool
                .ensure(&mut self.gpu, TargetSlot::Preview, width, height, PREVIEW_FORMAT)?;
        }

        if self.config.disable_outputs {
            let schema = SchemaBuilder::input_only();
            match schema::publish::<B, F>(&mut self.sync, &self.schema_path, &schema) {
                Ok(()) => self.stats.schema_publications += 1,
                Err(e) => warn!(error = %e, "Failed to publish input-only schema"),
            }
            self.schema = schema;
        } else {
            match self.sync.load_schema(&self.schema_path) {
                Ok(Some(existing)) if existing.scene_count() > 0 => {
                    info!(
                        scenes = existing.scene_count(),
                        path = %self.schema_path.display(),
                        "A schema existed on disk"
                    );
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Ignoring unreadable schema on disk"),
            }
            // The live schema is always rebuilt from enumeration.
            self.schema_dirty = true;
        }

        info!(
            windowed = self.config.windowed,
            input = self.config.enable_input,
            outputs = self.config.outputs_enabled(),
            prune = self.config.remove_sender_names,
            "Frame loop started"
        );
        self.started = true;
        Ok(())
    }

    /// Run one iteration.
    pub fn tick<H>(&mut self, host: &mut H) -> Result<TickOutcome>
    where
        H: Host<B> + ?Sized,
    {
        self.start()?;

        if host.should_stop() {
            info!("Shutdown requested");
            self.state = LoopState::Idle;
            return Ok(TickOutcome::Stopped);
        }
        self.stats.ticks += 1;

        if self.config.outputs_enabled() {
            self.refresh_sources();
            self.receive_source()?;
        }

        if self.config.windowed {
            self.present_preview(host)?;
        }

        self.state = LoopState::Awaiting;
        let outcome = match self.sync.await_frame(self.config.await_timeout()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = LoopState::Idle;
                return Err(e);
            }
        };

        let result = match outcome {
            AwaitOutcome::StreamsChanged => {
                self.state = LoopState::Reconciling;
                self.reconcile_streams()
            }
            AwaitOutcome::Timeout => {
                self.state = LoopState::TimedOut;
                self.stats.timeouts += 1;
                debug!(timeout_ms = self.config.await_timeout_ms, "Await timed out");
                Ok(TickOutcome::TimedOut)
            }
            AwaitOutcome::Frame(event) => {
                self.state = LoopState::Dispatching;
                self.dispatch(&event)
            }
        };

        self.state = LoopState::Idle;
        result
    }

    /// Tick until the host asks to stop or an error ends the session.
    /// All pooled targets are released either way.
    pub fn run<H>(&mut self, host: &mut H) -> Result<LoopStats>
    where
        H: Host<B> + ?Sized,
    {
        let result = loop {
            match self.tick(host) {
                Ok(TickOutcome::Stopped) => break Ok(()),
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, fatal = e.is_fatal(), "Frame loop terminated");
                    break Err(e);
                }
            }
        };

        self.pool.clear(&mut self.gpu);
        info!(
            ticks = self.stats.ticks,
            frames = self.stats.frames_dispatched,
            "Frame loop finished"
        );
        result.map(|()| self.stats)
    }

    fn refresh_sources(&mut self) {
        let snapshot = match self.video.enumerate_names() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Source enumeration failed; schema left as is");
                return;
            }
        };

        let changes = self.sources.refresh(snapshot);
        for name in &changes.added {
            info!(source = %name, "Source added");
        }
        for name in &changes.removed {
            info!(source = %name, "Source removed");
        }

        if !changes.is_empty() {
            self.schema_dirty = true;
        }
        if self.schema_dirty {
            self.republish();
        }
    }

    fn republish(&mut self) {
        let schema = self.builder.build(self.sources.names());
        match schema::publish::<B, F>(&mut self.sync, &self.schema_path, &schema) {
            Ok(()) => {
                self.schema = schema;
                self.schema_dirty = false;
                self.stats.schema_publications += 1;
            }
            Err(e) => warn!(error = %e, "Schema publication failed; retrying next tick"),
        }
    }

    fn receive_source(&mut self) -> Result<()> {
        if let Some((width, height)) = self.video.source_geometry() {
            tolerate(
                self.pool
                    .ensure(&mut self.gpu, TargetSlot::Source, width, height, SOURCE_FORMAT),
                "Source geometry rejected",
            )?;
        }

        let Some(target) = self.pool.get(TargetSlot::Source) else {
            return Ok(());
        };
        let received = tolerate(
            self.video.receive_into(&mut self.gpu, target),
            "Source receive failed",
        )?;
        if received == Some(true) {
            self.stats.frames_received += 1;
        }
        Ok(())
    }

    fn present_preview<H>(&mut self, host: &mut H) -> Result<()>
    where
        H: Host<B> + ?Sized,
    {
        let (Some(source), Some(preview)) = (
            self.pool.get(TargetSlot::Source),
            self.pool.get(TargetSlot::Preview),
        ) else {
            return Ok(());
        };

        self.gpu
            .blit(source, source.region(), preview, preview.region(), Flip::Vertical)?;
        tolerate(host.present(&mut self.gpu, preview), "Preview present failed")?;
        Ok(())
    }

    /// Replace the tracked stream set with the session's descriptors.
    fn reconcile_streams(&mut self) -> Result<TickOutcome> {
        self.stats.reconciliations += 1;

        let Some(descriptors) = tolerate(
            self.sync.stream_descriptors(),
            "Failed to fetch stream descriptors; keeping previous set",
        )?
        else {
            return Ok(TickOutcome::Reconciled {
                streams: self.streams.len(),
                evicted: Vec::new(),
            });
        };

        let mut accepted: Vec<StreamDescriptor> = Vec::with_capacity(descriptors.len());
        let mut keep: HashSet<StreamHandle> = HashSet::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if keep.contains(&descriptor.handle) {
                warn!(handle = %descriptor.handle, "Duplicate stream handle ignored");
                continue;
            }

            let slot = TargetSlot::Stream(descriptor.handle);
            match self.pool.ensure(
                &mut self.gpu,
                slot,
                descriptor.width,
                descriptor.height,
                descriptor.format,
            ) {
                Ok(_) => {
                    keep.insert(descriptor.handle);
                    accepted.push(descriptor);
                }
                Err(e) if e.is_request_rejection() => {
                    warn!(
                        handle = %descriptor.handle,
                        width = descriptor.width,
                        height = descriptor.height,
                        error = %e,
                        "Stream rejected"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let evicted = self.pool.retain_streams(&mut self.gpu, &keep);
        info!("Found {} streams", accepted.len());
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Evicted stale stream targets");
        }

        self.streams = accepted;
        Ok(TickOutcome::Reconciled {
            streams: self.streams.len(),
            evicted,
        })
    }

    fn dispatch(&mut self, event: &FrameEvent) -> Result<TickOutcome> {
        if let Err(e) = self.schema.scene(event.scene_index) {
            self.stats.stale_frames += 1;
            warn!(scene = event.scene_index, error = %e, "Scene out of bounds; frame skipped");
            return match e {
                BridgeError::StaleSceneIndex { index, scene_count } => Ok(TickOutcome::Skipped(
                    SkipReason::StaleSceneIndex { index, scene_count },
                )),
                other => Err(other),
            };
        }
        self.stats.frames_dispatched += 1;

        if self.config.outputs_enabled() {
            self.select_source(event.scene_index);
        }

        let input_forwarded = if self.config.enable_input {
            self.forward_input(event.scene_index)?
        } else {
            false
        };

        let frames_sent = if self.config.outputs_enabled() {
            self.send_streams(event)?
        } else {
            0
        };

        Ok(TickOutcome::Dispatched {
            frames_sent,
            input_forwarded,
        })
    }

    /// Point the receiver at the source the frame's scene stands for.
    ///
    /// Scene indices refer to the schema the session holds, which can lag
    /// the tracked source list while a republication is pending.
    fn select_source(&mut self, scene_index: u32) {
        let Ok(scene) = self.schema.scene(scene_index) else {
            return;
        };
        let name = scene.name.as_str();
        if self.sources.is_empty() && name == DEFAULT_SCENE {
            return;
        }
        if self.selected_source.as_deref() == Some(name) {
            return;
        }

        match self.video.select_source(name) {
            Ok(()) => {
                info!(source = %name, scene = scene_index, "Source selected");
                self.selected_source = Some(name.to_string());
            }
            Err(e) => warn!(source = %name, error = %e, "Failed to select source"),
        }
    }

    /// Forward the scene's incoming image as an outgoing video source.
    fn forward_input(&mut self, scene_index: u32) -> Result<bool> {
        let Some(image) = tolerate(
            self.sync
                .scene_parameter_image(scene_index, INPUT_PARAMETER_KEY),
            "No incoming image for scene",
        )?
        else {
            return Ok(false);
        };

        let ready = tolerate(
            self.pool.ensure(
                &mut self.gpu,
                TargetSlot::Input,
                image.width,
                image.height,
                image.format,
            ),
            "Incoming image rejected",
        )?;
        if ready.is_none() {
            return Ok(false);
        }
        let Some(target) = self.pool.get(TargetSlot::Input) else {
            return Ok(false);
        };

        if tolerate(
            self.sync.fetch_image(&mut self.gpu, &image, target),
            "Failed to fetch incoming image",
        )?
        .is_none()
        {
            return Ok(false);
        }

        let sent = tolerate(
            self.video.send_texture(
                &mut self.gpu,
                OUTGOING_SENDER_NAME,
                target,
                image.width,
                image.height,
            ),
            "Failed to forward incoming image",
        )?;

        if sent.is_some() {
            self.stats.inputs_forwarded += 1;
        }
        Ok(sent.is_some())
    }

    /// Copy the received source into every stream target and hand each to the session.
    fn send_streams(&mut self, event: &FrameEvent) -> Result<usize> {
        let Some(source) = self.pool.get(TargetSlot::Source) else {
            return Ok(0);
        };
        let source_region = source.region();
        let mut frames_sent = 0;

        for descriptor in &self.streams {
            let Some(target) = self.pool.get(TargetSlot::Stream(descriptor.handle)) else {
                continue;
            };

            self.gpu.clear(target)?;
            self.gpu.blit(
                source,
                source_region,
                target,
                descriptor.region(),
                Flip::None,
            )?;

            if let Err(e) = event.camera(descriptor.handle) {
                debug!(error = %e, "Sending frame without camera data");
            }
            let response = event.response_for(descriptor.handle);

            let sent = tolerate(
                self.sync
                    .send_stream_frame(&mut self.gpu, descriptor.handle, target, &response),
                "Failed to send stream frame",
            )?;
            if sent.is_some() {
                frames_sent += 1;
            }
        }

        self.stats.frames_sent += frames_sent as u64;
        Ok(frames_sent)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Last schema the session accepted.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Stream descriptors from the most recent reconciliation.
    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    pub fn selected_source(&self) -> Option<&str> {
        self.selected_source.as_deref()
    }

    pub fn pool(&self) -> &RenderTargetPool<B> {
        &self.pool
    }

    pub fn gpu(&self) -> &B {
        &self.gpu
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    pub fn sync(&self) -> &F {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut F {
        &mut self.sync
    }
}
