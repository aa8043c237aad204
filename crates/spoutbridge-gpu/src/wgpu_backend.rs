//! `GpuBackend` implementation on wgpu.

use spoutbridge_core::{PixelFormat, Region, Result};
use tracing::debug;

use crate::backend::{Flip, GpuBackend};
use crate::context::GpuContext;
use crate::copy::CopyEngine;
use crate::texture::RenderTarget;

/// The production backend: one device, one queue, one copy engine.
pub struct WgpuBackend {
    context: GpuContext,
    copy_engine: CopyEngine,
}

impl WgpuBackend {
    pub fn new(context: GpuContext) -> Result<Self> {
        let copy_engine = CopyEngine::new(&context)?;
        Ok(Self {
            context,
            copy_engine,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }
}

impl GpuBackend for WgpuBackend {
    type Target = RenderTarget;

    fn create_target(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<RenderTarget> {
        RenderTarget::new(&self.context, width, height, format, label)
    }

    fn destroy_target(&mut self, target: RenderTarget) {
        debug!(
            width = target.width,
            height = target.height,
            bytes = target.memory_size(),
            "Releasing render target"
        );
        target.texture.destroy();
    }

    fn fill(&mut self, target: &RenderTarget, color: [f64; 4]) -> Result<()> {
        self.copy_engine.fill(&self.context, target, color)
    }

    fn blit(
        &mut self,
        src: &RenderTarget,
        src_region: Region,
        dst: &RenderTarget,
        dst_region: Region,
        flip: Flip,
    ) -> Result<()> {
        self.copy_engine
            .copy(&self.context, src, src_region, dst, dst_region, flip)
    }
}
