//! wgpu render targets.

use spoutbridge_core::{validate_geometry, BridgeError, PixelFormat, Result};

use crate::backend::RenderSurface;
use crate::context::GpuContext;

/// Map a session pixel format to the texture format that stores it.
///
/// X formats share storage with their alpha counterparts; the copy engine
/// forces alpha to one when reading them.
pub fn texture_format(format: PixelFormat) -> Result<wgpu::TextureFormat> {
    match format {
        PixelFormat::Bgra8 | PixelFormat::Bgrx8 => Ok(wgpu::TextureFormat::Bgra8Unorm),
        PixelFormat::Rgba8 | PixelFormat::Rgbx8 => Ok(wgpu::TextureFormat::Rgba8Unorm),
        PixelFormat::Rgba16 => Ok(wgpu::TextureFormat::Rgba16Unorm),
        PixelFormat::Rgba32F => Ok(wgpu::TextureFormat::Rgba32Float),
        PixelFormat::Unknown(_) => Err(BridgeError::UnsupportedFormat(format)),
    }
}

/// A GPU texture plus the view used to render into and read from it.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub texture_format: wgpu::TextureFormat,
}

impl RenderTarget {
    /// Allocate a render target. Allocation is checked; any wgpu error is fatal.
    pub fn new(
        context: &GpuContext,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        label: &str,
    ) -> Result<Self> {
        validate_geometry(width, height)?;
        let texture_format = texture_format(pixel_format)?;
        if texture_format == wgpu::TextureFormat::Rgba16Unorm
            && !context.has_feature(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM)
        {
            return Err(BridgeError::UnsupportedFormat(pixel_format));
        }

        let texture = context.checked("Failed to create render target texture", |device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture_format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::COPY_SRC
                    | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        })?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
            pixel_format,
            texture_format,
        })
    }

    /// Memory usage estimate in bytes.
    pub fn memory_size(&self) -> usize {
        self.pixel_format
            .frame_size(self.width, self.height)
            .unwrap_or_default()
    }
}

impl RenderSurface for RenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }
}
