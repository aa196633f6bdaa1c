//! Per-frame drawing of the scene: stars first, then the globe, into one
//! depth-tested (and optionally multisampled) pass.

use terra_assets::LoadedImage;
use terra_config::Config;
use terra_planet::{GlobeDescriptor, GlobeRenderer, PhongMaterial, TextureSlot};
use terra_render::{
    CameraBinding, DepthBuffer, FrameEncoder, MultisampleTarget, RenderContext, RenderPassBuilder,
    SurfaceError, TextureError, TextureManager,
};
use terra_space::StarfieldRenderer;
use tracing::info;

use crate::context::SceneContext;

/// Star sprites are plain white.
const STAR_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// GPU resources for everything in [`SceneContext`].
pub struct SceneRenderer {
    camera: CameraBinding,
    depth: DepthBuffer,
    msaa: Option<MultisampleTarget>,
    textures: TextureManager,
    stars: StarfieldRenderer,
    globe: GlobeRenderer,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    pub fn new(
        gpu: &RenderContext,
        scene: &SceneContext,
        config: &Config,
    ) -> Result<Self, TextureError> {
        let device = &gpu.device;
        let (width, height) = gpu.size();
        let format = gpu.surface_format;
        let samples = gpu.sample_count;

        let camera = CameraBinding::new(device);
        let mut textures = TextureManager::new(device);

        let stars = StarfieldRenderer::new(
            device,
            &camera.layout,
            format,
            samples,
            &scene.stars,
            STAR_COLOR,
            config.scene.star_size,
            (width, height),
        );

        let s = &config.scene;
        let globe = GlobeRenderer::new(
            device,
            &gpu.queue,
            &camera.layout,
            &mut textures,
            format,
            samples,
            &GlobeDescriptor {
                planet_radius: s.planet_radius,
                cloud_radius: s.cloud_radius,
                segments: s.sphere_segments,
                surface: PhongMaterial::surface(s.surface_specular, s.surface_shininess),
                clouds: PhongMaterial::clouds(s.cloud_opacity),
            },
        )?;

        let [r, g, b, a] = config.render.clear_color;
        info!("Scene renderer ready: {width}x{height}, {samples}x MSAA, {format:?}");

        Ok(Self {
            camera,
            depth: DepthBuffer::new(device, width, height, samples),
            msaa: MultisampleTarget::new(device, format, width, height, samples),
            textures,
            stars,
            globe,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Resize every size-dependent target. Call after the surface is
    /// reconfigured.
    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        let (w, h) = (width.max(1), height.max(1));
        self.depth.resize(device, w, h);
        if let Some(msaa) = self.msaa.as_mut() {
            msaa.resize(device, w, h);
        }
        self.stars.resize(queue, w, h);
    }

    /// Upload a decoded image and bind it to `slot`.
    pub fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: TextureSlot,
        image: &LoadedImage,
    ) -> Result<(), TextureError> {
        let texture = self.textures.create_texture(
            device,
            queue,
            slot.name(),
            &image.rgba,
            image.width,
            image.height,
            slot.format(),
            true,
        )?;
        self.globe.set_texture(slot, texture);
        Ok(())
    }

    /// Draw one frame and present it.
    pub fn render(&self, gpu: &RenderContext, scene: &SceneContext) -> Result<(), SurfaceError> {
        let surface_texture = gpu.get_current_texture()?;

        self.camera.update(&gpu.queue, &scene.camera);
        let draw_globe = scene.should_draw_globe();
        if draw_globe {
            self.globe
                .update(&gpu.queue, &scene.planet, &scene.lights_uniform());
        }

        let mut frame = FrameEncoder::new(&gpu.device, gpu.queue.clone(), surface_texture);
        let mut builder = RenderPassBuilder::new()
            .label("scene-pass")
            .clear_color(self.clear_color)
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE);
        if let Some(msaa) = &self.msaa {
            builder = builder.multisampled(msaa.view.clone());
        }

        {
            let mut pass = frame.begin_render_pass(&builder);
            self.stars.render(&mut pass, &self.camera.bind_group);
            if draw_globe {
                self.globe.render(&mut pass, &self.camera.bind_group);
            }
        }

        frame.submit();
        Ok(())
    }
}
