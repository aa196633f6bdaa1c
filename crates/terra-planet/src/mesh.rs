//! Latitude/longitude sphere mesh.
//!
//! Vertices are laid out row by row from the north pole (`+Y`) to the south
//! pole, `width_segments + 1` per row so the texture seam gets its own column.
//! The top image row maps to the north pole.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use terra_render::VertexPositionNormalUv;

/// Upper bound on either segment count, keeping vertex indices within `u32`.
pub const MAX_SEGMENTS: u32 = 1024;

/// Indexed triangle mesh of a sphere centred on the origin.
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a UV sphere of `radius` with the given segment counts.
///
/// Segment counts are clamped to at least 3 around and 2 top to bottom, and to
/// at most [`MAX_SEGMENTS`] each.
/// Degenerate triangles touching the poles are omitted, so the mesh has
/// `width * (height - 1) * 2` triangles.
pub fn generate_uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> SphereMesh {
    let width = width_segments.clamp(3, MAX_SEGMENTS);
    let height = height_segments.clamp(2, MAX_SEGMENTS);
    let row_len = width + 1;

    let mut vertices = Vec::with_capacity(row_len as usize * (height as usize + 1));
    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        // Pole vertices sit half a segment over so each pole triangle samples
        // the middle of its column.
        let u_offset = if iy == 0 {
            0.5 / width as f32
        } else if iy == height {
            -0.5 / width as f32
        } else {
            0.0
        };

        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();

            let position = Vec3::new(
                -radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            );
            let normal = position.try_normalize().unwrap_or(Vec3::Y);

            vertices.push(VertexPositionNormalUv {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [u + u_offset, v],
            });
        }
    }

    let mut indices = Vec::with_capacity(width as usize * (height as usize - 1) * 6);
    for iy in 0..height {
        for ix in 0..width {
            let a = iy * row_len + ix + 1;
            let b = iy * row_len + ix;
            let c = (iy + 1) * row_len + ix;
            let d = (iy + 1) * row_len + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    SphereMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(mesh: &SphereMesh, i: u32) -> Vec3 {
        Vec3::from_array(mesh.vertices[i as usize].position)
    }

    #[test]
    fn test_vertex_and_index_counts() {
        let mesh = generate_uv_sphere(100.0, 64, 64);
        assert_eq!(mesh.vertices.len(), 65 * 65);
        assert_eq!(mesh.indices.len(), 64 * 63 * 6);
        assert_eq!(mesh.triangle_count(), 64 * 63 * 2);
    }

    #[test]
    fn test_vertices_on_sphere() {
        let mesh = generate_uv_sphere(101.0, 64, 64);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 101.0).abs() < 1e-3, "vertex at radius {len}");
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = generate_uv_sphere(100.0, 16, 8);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((n - p / 100.0).length() < 1e-4);
        }
    }

    #[test]
    fn test_poles_and_uv_orientation() {
        let mesh = generate_uv_sphere(1.0, 8, 4);
        let first = &mesh.vertices[0];
        let last = mesh.vertices.last().unwrap();
        assert!((first.position[1] - 1.0).abs() < 1e-6, "first row is the north pole");
        assert!((last.position[1] + 1.0).abs() < 1e-6);
        assert_eq!(first.uv, [0.5 / 8.0, 0.0]);
        assert_eq!(last.uv, [1.0 - 0.5 / 8.0, 1.0]);
    }

    #[test]
    fn test_uvs_in_range() {
        let mesh = generate_uv_sphere(1.0, 32, 16);
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]), "u = {}", v.uv[0]);
            assert!((0.0..=1.0).contains(&v.uv[1]), "v = {}", v.uv[1]);
        }
    }

    #[test]
    fn test_no_degenerate_triangles() {
        let mesh = generate_uv_sphere(1.0, 16, 8);
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (pos(&mesh, tri[0]), pos(&mesh, tri[1]), pos(&mesh, tri[2]));
            let area = (b - a).cross(c - a).length() * 0.5;
            assert!(area > 1e-6, "degenerate triangle {tri:?}");
        }
    }

    #[test]
    fn test_triangles_wind_counter_clockwise_from_outside() {
        let mesh = generate_uv_sphere(1.0, 16, 8);
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (pos(&mesh, tri[0]), pos(&mesh, tri[1]), pos(&mesh, tri[2]));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = generate_uv_sphere(1.0, 5, 3);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_segment_counts_clamped() {
        let mesh = generate_uv_sphere(1.0, 0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert_eq!(mesh.triangle_count(), 3 * 2);
    }

    #[test]
    fn test_segment_counts_capped() {
        let mesh = generate_uv_sphere(1.0, 30_000, 2);
        let width = MAX_SEGMENTS as usize;
        assert_eq!(mesh.vertices.len(), (width + 1) * 3);
        assert_eq!(mesh.triangle_count(), width * 2);
    }
}
