//! Pixel formats exchanged with the frame-sync session.
//!
//! The session describes every stream with one of a small set of packed
//! RGBA-family formats. Anything outside that table is carried as
//! [`PixelFormat::Unknown`] so it can be rejected at the point of use
//! instead of failing to decode the whole descriptor set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, Result};

/// Pixel format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit BGRA
    Bgra8,
    /// 8-bit BGR, alpha channel undefined
    Bgrx8,
    /// 32-bit float RGBA
    #[default]
    Rgba32F,
    /// 16-bit unsigned normalized RGBA
    Rgba16,
    /// 8-bit RGBA
    Rgba8,
    /// 8-bit RGB, alpha channel undefined
    Rgbx8,
    /// Raw format code the bridge has no mapping for.
    Unknown(u32),
}

impl PixelFormat {
    /// Every format the bridge can allocate and copy.
    pub const SUPPORTED: [PixelFormat; 6] = [
        Self::Bgra8,
        Self::Bgrx8,
        Self::Rgba32F,
        Self::Rgba16,
        Self::Rgba8,
        Self::Rgbx8,
    ];

    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns the format itself, or `UnsupportedFormat` for unmapped codes.
    pub fn validate(self) -> Result<Self> {
        if self.is_supported() {
            Ok(self)
        } else {
            Err(BridgeError::UnsupportedFormat(self))
        }
    }

    /// Bytes per pixel, `None` for unknown formats.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Bgra8 | Self::Bgrx8 | Self::Rgba8 | Self::Rgbx8 => Some(4),
            Self::Rgba16 => Some(8),
            Self::Rgba32F => Some(16),
            Self::Unknown(_) => None,
        }
    }

    /// Whether the alpha channel carries meaningful data.
    ///
    /// Copies out of an X format write opaque alpha.
    pub fn has_alpha(self) -> bool {
        !matches!(self, Self::Bgrx8 | Self::Rgbx8)
    }

    /// Calculate total bytes needed for a frame of this format.
    pub fn frame_size(self, width: u32, height: u32) -> Option<usize> {
        self.bytes_per_pixel()
            .map(|bpp| width as usize * height as usize * bpp)
    }

    /// Short lowercase name, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Bgra8 => "bgra8",
            Self::Bgrx8 => "bgrx8",
            Self::Rgba32F => "rgba32f",
            Self::Rgba16 => "rgba16",
            Self::Rgba8 => "rgba8",
            Self::Rgbx8 => "rgbx8",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown({code})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for PixelFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|f| f.name() == lower)
            .ok_or_else(|| BridgeError::Config(format!("unknown pixel format '{s}'")))
    }
}
