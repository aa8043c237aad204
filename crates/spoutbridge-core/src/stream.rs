//! Stream identity, descriptors and copy regions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BridgeError, Result};
use crate::format::PixelFormat;

/// Opaque identifier the frame-sync session assigns to one output channel.
///
/// Stable for the lifetime of the descriptor that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamHandle(pub u64);

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One output stream as declared by the frame-sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub handle: StreamHandle,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl StreamDescriptor {
    pub fn new(handle: StreamHandle, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            handle,
            width,
            height,
            format,
        }
    }

    /// The full extent of this stream.
    pub fn region(&self) -> Region {
        Region::full(self.width, self.height)
    }
}

/// Rejects zero-sized allocations before they reach the GPU.
pub fn validate_geometry(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(BridgeError::InvalidGeometry { width, height });
    }
    Ok(())
}

/// Axis-aligned rectangle in texel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width` x `height` surface.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the region lies inside a `width` x `height` surface.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height)
    }

    /// Checked against the surface it addresses; empty regions are invalid geometry.
    pub fn validate_within(&self, width: u32, height: u32) -> Result<()> {
        if self.is_empty() || !self.fits_within(width, height) {
            return Err(BridgeError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
