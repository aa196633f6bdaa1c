//! Perspective camera producing reverse-Z view/projection matrices.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

/// Camera data uploaded to group 0 of every scene pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix (column-major).
    pub view_proj: [[f32; 4]; 4],
    /// World-space camera position (w unused).
    pub camera_pos: [f32; 4],
}

impl CameraUniform {
    /// Size in bytes, used as the binding's minimum size.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

/// A perspective camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion; the camera looks down its local -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Build a camera from a vertical field of view in degrees.
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
            ..Self::default()
        }
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Reverse-Z projection: near maps to depth 1, far to depth 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Orient the camera toward `target`, keeping `world_up` as close to up as possible.
    ///
    /// Leaves the rotation untouched when `target` coincides with the position.
    pub fn look_at(&mut self, target: Vec3, world_up: Vec3) {
        let Some(back) = (self.position - target).try_normalize() else {
            return;
        };
        let right = world_up
            .cross(back)
            .try_normalize()
            .unwrap_or_else(|| back.any_orthonormal_vector());
        let up = back.cross(right);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize();
    }

    /// Update the aspect ratio from the output size.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height;
    }

    /// Convert the camera to a uniform suitable for GPU upload.
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.position.extend(1.0).to_array(),
        }
    }
}

/// Camera uniform buffer bound at group 0 by every scene pipeline.
pub struct CameraBinding {
    pub buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl CameraBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(CameraUniform::SIZE),
                },
                count: None,
            }],
        });

        let buffer = crate::buffer::BufferAllocator::new(device)
            .create_uniform_buffer("camera-uniform", &Camera::default().to_uniform());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bg"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    /// Upload the camera's current matrices.
    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&camera.to_uniform()));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let forward = Camera::default().forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_perspective_converts_degrees() {
        let camera = Camera::perspective(45.0, 2.0, 0.1, 1000.0);
        assert!((camera.fov_y - FRAC_PI_4).abs() < 1e-6);
        assert_eq!(camera.aspect_ratio, 2.0);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(600.0, 800.0);
        assert!((camera.aspect_ratio - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = Camera::perspective(45.0, 1.0, 0.1, 1000.0);
        let proj = camera.projection_matrix();

        let near = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -1000.0, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-4);
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut camera = Camera {
            position: Vec3::new(0.0, 0.0, 250.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO, Vec3::Y);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((camera.up() - Vec3::Y).length() < 1e-5);

        camera.position = Vec3::new(120.0, 80.0, -40.0);
        camera.look_at(Vec3::ZERO, Vec3::Y);
        let expected = (-camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
        assert!(camera.right().y.abs() < 1e-5, "no roll");
    }

    #[test]
    fn test_look_at_target_at_position_is_noop() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::ZERO, Vec3::Y);
        assert_eq!(camera.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let camera = Camera {
            position: Vec3::new(10.0, 20.0, 30.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Camera::default()
        };
        let reconstructed_pos = camera.view_matrix().inverse().col(3).truncate();
        assert!((reconstructed_pos - camera.position).length() < 1e-4);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(CameraUniform::SIZE, 80);
        let camera = Camera {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Camera::default()
        };
        assert_eq!(camera.to_uniform().camera_pos, [1.0, 2.0, 3.0, 1.0]);
    }
}
