//! Render-target pool keyed by stream handle.
//!
//! Exactly one live target exists per slot. A request whose geometry or
//! format differs from the live target destroys it and allocates a new one
//! under the same key; targets are never resized in place.

use spoutbridge_core::{validate_geometry, PixelFormat, Result, StreamHandle};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};

use crate::backend::{GpuBackend, RenderSurface};

/// Key for pooled targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetSlot {
    /// Output stream declared by the frame-sync session.
    Stream(StreamHandle),
    /// Local copy of the selected video source.
    Source,
    /// Incoming image forwarded to the video-source service.
    Input,
    /// Windowed preview.
    Preview,
}

impl fmt::Display for TargetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(handle) => write!(f, "stream {}", handle),
            Self::Source => f.write_str("source"),
            Self::Input => f.write_str("input"),
            Self::Preview => f.write_str("preview"),
        }
    }
}

/// What `ensure` had to do to satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The live target already matched.
    Reused,
    /// First allocation for this slot.
    Created,
    /// The old target was destroyed and a new one allocated.
    Recreated,
}

/// Owns every render target the bridge allocates.
pub struct RenderTargetPool<B: GpuBackend> {
    targets: HashMap<TargetSlot, B::Target>,
    allocations: u64,
    releases: u64,
}

impl<B: GpuBackend> Default for RenderTargetPool<B> {
    fn default() -> Self {
        Self {
            targets: HashMap::new(),
            allocations: 0,
            releases: 0,
        }
    }
}

impl<B: GpuBackend> RenderTargetPool<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `slot` holds a target of exactly this geometry and format.
    ///
    /// Zero dimensions fail with `InvalidGeometry` and unmapped formats with
    /// `UnsupportedFormat`; in both cases the live target is left untouched.
    pub fn ensure(
        &mut self,
        gpu: &mut B,
        slot: TargetSlot,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Allocation> {
        validate_geometry(width, height)?;
        format.validate()?;

        if let Some(existing) = self.targets.get(&slot) {
            if existing.matches(width, height, format) {
                return Ok(Allocation::Reused);
            }
        }

        let allocation = match self.targets.remove(&slot) {
            Some(old) => {
                debug!(
                    %slot,
                    old_width = old.width(),
                    old_height = old.height(),
                    "Destroying render target for reallocation"
                );
                gpu.destroy_target(old);
                self.releases += 1;
                Allocation::Recreated
            }
            None => Allocation::Created,
        };

        let target = gpu.create_target(&slot.to_string(), width, height, format)?;
        self.allocations += 1;
        self.targets.insert(slot, target);

        info!(%slot, width, height, %format, ?allocation, "Render target ready");
        Ok(allocation)
    }

    /// Return the target for `slot`, allocating or recreating it as needed.
    pub fn get_or_create(
        &mut self,
        gpu: &mut B,
        slot: TargetSlot,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<&B::Target> {
        self.ensure(gpu, slot, width, height, format)?;
        Ok(&self.targets[&slot])
    }

    pub fn get(&self, slot: TargetSlot) -> Option<&B::Target> {
        self.targets.get(&slot)
    }

    pub fn contains(&self, slot: TargetSlot) -> bool {
        self.targets.contains_key(&slot)
    }

    /// Release a target's resources. Returns whether one existed.
    pub fn evict(&mut self, gpu: &mut B, slot: TargetSlot) -> bool {
        match self.targets.remove(&slot) {
            Some(target) => {
                gpu.destroy_target(target);
                self.releases += 1;
                info!(%slot, "Render target evicted");
                true
            }
            None => false,
        }
    }

    /// Evict every stream target whose handle is not in `keep`.
    ///
    /// Returns the evicted handles in ascending order.
    pub fn retain_streams(&mut self, gpu: &mut B, keep: &HashSet<StreamHandle>) -> Vec<StreamHandle> {
        let mut stale: Vec<StreamHandle> = self
            .stream_handles()
            .into_iter()
            .filter(|handle| !keep.contains(handle))
            .collect();
        stale.sort();

        for handle in &stale {
            self.evict(gpu, TargetSlot::Stream(*handle));
        }
        stale
    }

    /// Handles with a live stream target, in ascending order.
    pub fn stream_handles(&self) -> Vec<StreamHandle> {
        let mut handles: Vec<StreamHandle> = self
            .targets
            .keys()
            .filter_map(|slot| match slot {
                TargetSlot::Stream(handle) => Some(*handle),
                _ => None,
            })
            .collect();
        handles.sort();
        handles
    }

    /// Number of live targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Total allocations performed over the pool's lifetime.
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    /// Total targets destroyed over the pool's lifetime.
    pub fn release_count(&self) -> u64 {
        self.releases
    }

    /// Destroy all targets.
    pub fn clear(&mut self, gpu: &mut B) {
        for (_, target) in self.targets.drain() {
            gpu.destroy_target(target);
            self.releases += 1;
        }
    }
}
