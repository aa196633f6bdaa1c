//! wgpu rendering foundation: device and surface setup, camera, depth and MSAA
//! targets, buffers, textures and per-frame render passes.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod surface;
pub mod texture;

pub use buffer::{BufferAllocator, IndexData, MeshBuffer, VertexPositionNormalUv};
pub use camera::{Camera, CameraBinding, CameraUniform};
pub use depth::{DepthBuffer, MultisampleTarget};
pub use gpu::{
    GpuOptions, RenderContext, RenderContextError, SurfaceError, init_render_context_blocking,
};
pub use pass::{DepthAttachmentConfig, FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
pub use texture::{ManagedTexture, TextureError, TextureManager, mip_level_count};
