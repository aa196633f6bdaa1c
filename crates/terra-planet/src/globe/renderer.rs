//! Surface and cloud pipelines sharing one shader.
//!
//! Bind groups:
//! - group 0: camera (shared with every scene pipeline)
//! - group 1: body uniform + scene lights
//! - group 2: colour map (surface) or cloud map (clouds)
//! - group 3: specular map (surface only)

use std::sync::Arc;

use terra_lighting::SceneLightsUniform;
use terra_render::{
    BufferAllocator, DepthBuffer, IndexData, ManagedTexture, MeshBuffer, TextureError,
    TextureManager, VertexPositionNormalUv,
};
use tracing::{debug, info};

use super::slot::TextureSlot;
use crate::group::PlanetGroup;
use crate::material::{BodyUniform, PhongMaterial};
use crate::mesh::generate_uv_sphere;

/// WGSL source for the globe shader.
pub const GLOBE_SHADER_SOURCE: &str = include_str!("globe.wgsl");

/// Geometry and materials of the globe.
#[derive(Clone, Debug)]
pub struct GlobeDescriptor {
    pub planet_radius: f32,
    pub cloud_radius: f32,
    /// Segments around and top to bottom, for both spheres.
    pub segments: u32,
    pub surface: PhongMaterial,
    pub clouds: PhongMaterial,
}

impl Default for GlobeDescriptor {
    fn default() -> Self {
        Self {
            planet_radius: 100.0,
            cloud_radius: 101.0,
            segments: 64,
            surface: PhongMaterial::surface(0x333333, 5.0),
            clouds: PhongMaterial::clouds(0.8),
        }
    }
}

struct Body {
    mesh: MeshBuffer,
    material: PhongMaterial,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the planet surface, then the cloud shell blended over it.
pub struct GlobeRenderer {
    surface_pipeline: wgpu::RenderPipeline,
    cloud_pipeline: wgpu::RenderPipeline,
    surface: Body,
    clouds: Body,
    lights_buffer: wgpu::Buffer,
    textures: [Arc<ManagedTexture>; 3],
    placeholder: [bool; 3],
}

impl GlobeRenderer {
    /// Build pipelines and meshes and bind placeholder textures to every slot.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_layout: &wgpu::BindGroupLayout,
        texture_manager: &mut TextureManager,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
        desc: &GlobeDescriptor,
    ) -> Result<Self, TextureError> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("globe-shader"),
            source: wgpu::ShaderSource::Wgsl(GLOBE_SHADER_SOURCE.into()),
        });

        let uniform_entry = |binding: u32, size: u64| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(size),
            },
            count: None,
        };
        let body_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-body-bgl"),
            entries: &[
                uniform_entry(0, BodyUniform::SIZE),
                uniform_entry(1, std::mem::size_of::<SceneLightsUniform>() as u64),
            ],
        });

        let texture_bgl = texture_manager.bind_group_layout();
        let surface_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe-surface-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &body_bgl, texture_bgl, texture_bgl],
            immediate_size: 0,
        });
        let cloud_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe-cloud-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &body_bgl, texture_bgl],
            immediate_size: 0,
        });

        let surface_pipeline = create_pipeline(
            device,
            &shader,
            &surface_layout,
            "globe-surface-pipeline",
            "fs_surface",
            color_format,
            sample_count,
            None,
        );
        let cloud_pipeline = create_pipeline(
            device,
            &shader,
            &cloud_layout,
            "globe-cloud-pipeline",
            "fs_cloud",
            color_format,
            sample_count,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        let allocator = BufferAllocator::new(device);
        let lights_buffer =
            allocator.create_uniform_buffer("globe-lights", &SceneLightsUniform::default());

        let build_body = |label: &str, radius: f32, material: &PhongMaterial| {
            let sphere = generate_uv_sphere(radius, desc.segments, desc.segments);
            let mesh = allocator.create_mesh(
                label,
                bytemuck::cast_slice::<VertexPositionNormalUv, u8>(&sphere.vertices),
                IndexData::U32(&sphere.indices),
            );
            let uniform_buffer = allocator.create_uniform_buffer(
                &format!("{label}-body"),
                &BodyUniform::new(glam::Mat4::IDENTITY, material),
            );
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label}-body-bg")),
                layout: &body_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: lights_buffer.as_entire_binding(),
                    },
                ],
            });
            debug!(
                "{label}: radius {radius}, {} vertices, {} triangles",
                sphere.vertices.len(),
                sphere.triangle_count()
            );
            Body {
                mesh,
                material: material.clone(),
                uniform_buffer,
                bind_group,
            }
        };
        let surface = build_body("globe-surface", desc.planet_radius, &desc.surface);
        let clouds = build_body("globe-clouds", desc.cloud_radius, &desc.clouds);

        let mut placeholder = |slot: TextureSlot| {
            texture_manager.create_solid(
                device,
                queue,
                &format!("{}-placeholder", slot.name()),
                slot.placeholder_rgba(),
                slot.format(),
            )
        };
        let textures = [
            placeholder(TextureSlot::ColorMap)?,
            placeholder(TextureSlot::SpecularMap)?,
            placeholder(TextureSlot::CloudMap)?,
        ];

        info!(
            "Globe renderer initialized (planet r={}, clouds r={}, {} segments, {} samples)",
            desc.planet_radius, desc.cloud_radius, desc.segments, sample_count
        );

        Ok(Self {
            surface_pipeline,
            cloud_pipeline,
            surface,
            clouds,
            lights_buffer,
            textures,
            placeholder: [true; 3],
        })
    }

    /// Replace a slot's texture, typically once its image has loaded.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: Arc<ManagedTexture>) {
        debug!(
            "Binding {slot} ({}x{})",
            texture.dimensions.0, texture.dimensions.1
        );
        self.textures[slot.index()] = texture;
        self.placeholder[slot.index()] = false;
    }

    /// Whether `slot` still uses its placeholder.
    pub fn is_placeholder(&self, slot: TextureSlot) -> bool {
        self.placeholder[slot.index()]
    }

    /// Upload this frame's rotations and lighting.
    pub fn update(&self, queue: &wgpu::Queue, group: &PlanetGroup, lights: &SceneLightsUniform) {
        let surface = BodyUniform::new(group.surface_model_matrix(), &self.surface.material);
        let clouds = BodyUniform::new(group.cloud_model_matrix(), &self.clouds.material);
        queue.write_buffer(&self.surface.uniform_buffer, 0, bytemuck::bytes_of(&surface));
        queue.write_buffer(&self.clouds.uniform_buffer, 0, bytemuck::bytes_of(&clouds));
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(lights));
    }

    /// Draw the surface and then the clouds.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        let [color, specular, cloud] = &self.textures;

        pass.set_pipeline(&self.surface_pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.surface.bind_group, &[]);
        pass.set_bind_group(2, &color.bind_group, &[]);
        pass.set_bind_group(3, &specular.bind_group, &[]);
        self.surface.mesh.bind(pass);
        self.surface.mesh.draw(pass);

        pass.set_pipeline(&self.cloud_pipeline);
        pass.set_bind_group(1, &self.clouds.bind_group, &[]);
        pass.set_bind_group(2, &cloud.bind_group, &[]);
        self.clouds.mesh.bind(pass);
        self.clouds.mesh.draw(pass);
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    label: &str,
    fragment_entry: &str,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_globe"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(DepthBuffer::stencil_state(true)),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
