//! Instanced point-sprite renderer for the starfield.
//!
//! Each star is a screen-aligned square expanded from its world position in the
//! vertex shader. Size is attenuated with distance so that a star `d` units away
//! covers `size * (viewport_height / 2) / d` pixels.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use terra_render::{BufferAllocator, DepthBuffer};

/// Per-instance star data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
}

impl StarInstance {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }],
    };
}

/// GPU uniform for the star shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarUniforms {
    /// Linear RGB colour, alpha unused.
    pub color: [f32; 4],
    /// x: world size, y: viewport height / width, zw: padding.
    pub params: [f32; 4],
}

impl StarUniforms {
    pub fn new(color: [f32; 3], size: f32, width: u32, height: u32) -> Self {
        Self {
            color: [color[0], color[1], color[2], 1.0],
            params: [size, inverse_aspect(width, height), 0.0, 0.0],
        }
    }
}

fn inverse_aspect(width: u32, height: u32) -> f32 {
    height.max(1) as f32 / width.max(1) as f32
}

/// WGSL shader source for the star sprites.
pub const STAR_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct StarUniforms {
    color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> stars: StarUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_star(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    let corner = corners[vertex_index];

    var out: VertexOutput;
    let clip = camera.view_proj * vec4<f32>(position, 1.0);
    // Offset in clip space; the divide by w gives distance attenuation.
    let half_size = stars.params.x * 0.5;
    let offset = corner * half_size * vec2<f32>(stars.params.y, 1.0);
    out.clip_position = vec4<f32>(clip.xy + offset, clip.z, clip.w);
    return out;
}

@fragment
fn fs_star(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(stars.color.rgb, 1.0);
}
"#;

/// GPU starfield renderer.
pub struct StarfieldRenderer {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    uniforms: StarUniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl StarfieldRenderer {
    /// Create the renderer and upload `stars` once.
    ///
    /// `camera_layout` is the shared group 0 layout; `color` is linear RGB.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
        stars: &[Vec3],
        color: [f32; 3],
        size: f32,
        viewport: (u32, u32),
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star-shader"),
            source: wgpu::ShaderSource::Wgsl(STAR_SHADER_SOURCE.into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("star-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<StarUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("star-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &uniform_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_star"),
                buffers: &[StarInstance::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(true)),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_star"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let instances: Vec<StarInstance> = stars
            .iter()
            .map(|p| StarInstance {
                position: p.to_array(),
            })
            .collect();
        let allocator = BufferAllocator::new(device);
        let instance_buffer =
            allocator.create_vertex_buffer("star-instances", bytemuck::cast_slice(&instances));

        let uniforms = StarUniforms::new(color, size, viewport.0, viewport.1);
        let uniform_buffer = allocator.create_uniform_buffer("star-uniforms", &uniforms);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("star-uniform-bg"),
            layout: &uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!("Starfield renderer initialized with {} stars", instances.len());

        Self {
            pipeline,
            instance_buffer,
            instance_count: instances.len() as u32,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
        }
    }

    /// Keep sprite proportions square after the viewport changes.
    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.uniforms.params[1] = inverse_aspect(width, height);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    pub fn star_count(&self) -> u32 {
        self.instance_count
    }

    /// Draw every star. Group 0 must already hold the camera bind group.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.instance_count);
    }
}
