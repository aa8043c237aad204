//! GPU context management.

use spoutbridge_core::{BridgeError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// GPU context holding device and queue.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Create a new headless GPU context.
    ///
    /// The bridge never presents to a swapchain of its own, so no
    /// compatible surface is requested.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BridgeError::FatalGpu("No suitable GPU adapter found".to_string()))?;

        info!("Using GPU adapter: {:?}", adapter.get_info());

        // 16-bit unorm targets back the Rgba16 stream format.
        let mut required_features = wgpu::Features::empty();
        if adapter
            .features()
            .contains(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM)
        {
            required_features |= wgpu::Features::TEXTURE_FORMAT_16BIT_NORM;
        } else {
            warn!("Adapter lacks 16-bit normalized textures; rgba16 streams will be rejected");
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("SpoutBridge Device"),
                    required_features,
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 8192,
                        ..wgpu::Limits::default()
                    },
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| BridgeError::FatalGpu(format!("Failed to create device: {}", e)))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Create a new GPU context (blocking version).
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }

    /// Get adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Whether the device was created with a feature enabled.
    pub fn has_feature(&self, feature: wgpu::Features) -> bool {
        self.device.features().contains(feature)
    }

    /// Run `op` inside validation and out-of-memory error scopes.
    ///
    /// wgpu reports most failures asynchronously; popping the scopes here
    /// turns them into an immediate `FatalGpu` at the call site.
    pub fn checked<T>(&self, what: &str, op: impl FnOnce(&wgpu::Device) -> T) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let value = op(&self.device);

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        match validation.or(out_of_memory) {
            Some(err) => Err(BridgeError::FatalGpu(format!("{}: {}", what, err))),
            None => Ok(value),
        }
    }
}
