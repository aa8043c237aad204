//! The seam between the bridge logic and the graphics API.
//!
//! Everything above this trait (pool, frame loop, services) is written
//! against `GpuBackend`, so it runs unchanged on wgpu and on the CPU-only
//! fakes the tests use.

use spoutbridge_core::{PixelFormat, Region, Result};

/// A texture the bridge can render into and copy out of.
pub trait RenderSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel_format(&self) -> PixelFormat;

    /// The full extent of this surface.
    fn region(&self) -> Region {
        Region::full(self.width(), self.height())
    }

    /// Whether this surface already has the requested geometry and format.
    fn matches(&self, width: u32, height: u32, format: PixelFormat) -> bool {
        self.width() == width && self.height() == height && self.pixel_format() == format
    }
}

/// Vertical orientation of a blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flip {
    #[default]
    None,
    /// Row 0 of the source lands on the last row of the destination.
    Vertical,
}

/// GPU operations the bridge needs. Every call is checked: an `Err` carrying
/// `FatalGpu` means context state is no longer trustworthy.
pub trait GpuBackend {
    type Target: RenderSurface;

    /// Allocate a texture plus render surface. Geometry and format are
    /// validated by the caller.
    fn create_target(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self::Target>;

    /// Release a target's GPU resources immediately.
    fn destroy_target(&mut self, target: Self::Target);

    /// Fill the whole target with a solid color (linear RGBA).
    fn fill(&mut self, target: &Self::Target, color: [f64; 4]) -> Result<()>;

    /// Clear to transparent black.
    fn clear(&mut self, target: &Self::Target) -> Result<()> {
        self.fill(target, [0.0, 0.0, 0.0, 0.0])
    }

    /// Nearest-neighbor, format-reinterpreting copy of `src_region` into `dst_region`.
    fn blit(
        &mut self,
        src: &Self::Target,
        src_region: Region,
        dst: &Self::Target,
        dst_region: Region,
        flip: Flip,
    ) -> Result<()>;
}
