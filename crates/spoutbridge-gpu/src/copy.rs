//! GPU-side blit between render targets.
//!
//! Copies run as a full-screen triangle restricted to the destination
//! region. The fragment shader maps each destination pixel to one source
//! texel with `textureLoad`, which gives nearest-neighbor rescaling without
//! a sampler and works for every supported format, including unfilterable
//! 32-bit float. Channel order is reinterpreted by the texture formats
//! themselves; X sources get their alpha forced to one.

use bytemuck::{Pod, Zeroable};
use spoutbridge_core::{BridgeError, Region, Result};
use std::collections::HashMap;
use tracing::debug;

use crate::backend::Flip;
use crate::context::GpuContext;
use crate::texture::RenderTarget;

const BLIT_SHADER: &str = r#"
struct BlitParams {
    src_origin: vec2<f32>,
    src_size: vec2<f32>,
    dst_origin: vec2<f32>,
    dst_size: vec2<f32>,
    flip_y: u32,
    force_opaque: u32,
    _pad: vec2<u32>,
}

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var<uniform> params: BlitParams;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    let x = f32((vertex_index & 1u) << 2u) - 1.0;
    let y = f32((vertex_index & 2u) << 1u) - 1.0;
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    var uv = (frag.xy - params.dst_origin) / params.dst_size;
    if (params.flip_y != 0u) {
        uv.y = 1.0 - uv.y;
    }
    let max_texel = params.src_origin + params.src_size - vec2<f32>(1.0, 1.0);
    let texel = clamp(floor(params.src_origin + uv * params.src_size), params.src_origin, max_texel);
    var color = textureLoad(source, vec2<i32>(texel), 0);
    if (params.force_opaque != 0u) {
        color.a = 1.0;
    }
    return color;
}
"#;

/// Uniform block matching `BlitParams` in the shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlitParams {
    src_origin: [f32; 2],
    src_size: [f32; 2],
    dst_origin: [f32; 2],
    dst_size: [f32; 2],
    flip_y: u32,
    force_opaque: u32,
    _pad: [u32; 2],
}

impl BlitParams {
    fn new(src: Region, dst: Region, flip: Flip, force_opaque: bool) -> Self {
        Self {
            src_origin: [src.x as f32, src.y as f32],
            src_size: [src.width as f32, src.height as f32],
            dst_origin: [dst.x as f32, dst.y as f32],
            dst_size: [dst.width as f32, dst.height as f32],
            flip_y: u32::from(flip == Flip::Vertical),
            force_opaque: u32::from(force_opaque),
            _pad: [0; 2],
        }
    }
}

/// Format-aware, rescaling copy between two render targets.
pub struct CopyEngine {
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    /// One pipeline per destination texture format.
    pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    params: wgpu::Buffer,
}

impl CopyEngine {
    pub fn new(context: &GpuContext) -> Result<Self> {
        context.checked("Failed to create copy engine", |device| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Blit Shader"),
                source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
            });

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Blit Bind Group Layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Blit Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            let params = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Blit Params"),
                size: std::mem::size_of::<BlitParams>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            Self {
                shader,
                bind_group_layout,
                pipeline_layout,
                pipelines: HashMap::new(),
                params,
            }
        })
    }

    fn pipeline(&mut self, context: &GpuContext, format: wgpu::TextureFormat) -> Result<()> {
        if self.pipelines.contains_key(&format) {
            return Ok(());
        }

        let pipeline = context.checked("Failed to create blit pipeline", |device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Blit Pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        debug!(?format, "Blit pipeline created");
        self.pipelines.insert(format, pipeline);
        Ok(())
    }

    /// Copy `src_region` of `src` into `dst_region` of `dst`, rescaling with
    /// nearest-neighbor sampling. Pixels outside `dst_region` are preserved.
    pub fn copy(
        &mut self,
        context: &GpuContext,
        src: &RenderTarget,
        src_region: Region,
        dst: &RenderTarget,
        dst_region: Region,
        flip: Flip,
    ) -> Result<()> {
        src_region.validate_within(src.width, src.height)?;
        dst_region.validate_within(dst.width, dst.height)?;
        if std::ptr::eq(src, dst) {
            return Err(BridgeError::FatalGpu(
                "Blit source and destination are the same texture".to_string(),
            ));
        }

        self.pipeline(context, dst.texture_format)?;
        let pipeline = &self.pipelines[&dst.texture_format];

        let params = BlitParams::new(src_region, dst_region, flip, !src.pixel_format.has_alpha());
        context
            .queue
            .write_buffer(&self.params, 0, bytemuck::bytes_of(&params));

        context.checked("Failed to blit", |device| {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blit Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: self.params.as_entire_binding(),
                    },
                ],
            });

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Encoder"),
            });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Blit Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &dst.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_viewport(
                    dst_region.x as f32,
                    dst_region.y as f32,
                    dst_region.width as f32,
                    dst_region.height as f32,
                    0.0,
                    1.0,
                );
                pass.set_scissor_rect(dst_region.x, dst_region.y, dst_region.width, dst_region.height);
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
            context.queue.submit(Some(encoder.finish()));
        })
    }

    /// Overwrite every pixel of `target` with `color`.
    pub fn fill(&self, context: &GpuContext, target: &RenderTarget, color: [f64; 4]) -> Result<()> {
        context.checked("Failed to clear render target", |device| {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
            {
                let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: color[0],
                                g: color[1],
                                b: color[2],
                                a: color[3],
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            }
            context.queue.submit(Some(encoder.finish()));
        })
    }
}
