//! UV sphere mesh generation

use std::f32::consts::{PI, TAU};

/// Vertex with position, normal and texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Unit sphere with `segments` slices around the Y axis and `rings` stacks
    /// from pole to pole.
    ///
    /// The seam column is duplicated so equirectangular textures wrap without a
    /// smeared strip; `u` runs 0..1 eastward, `v` 0..1 from north to south pole.
    pub fn uv_sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * PI;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let phi = u * TAU;
                let (sin_phi, cos_phi) = phi.sin_cos();

                let normal = [sin_theta * cos_phi, cos_theta, -sin_theta * sin_phi];
                vertices.push(MeshVertex {
                    position: normal,
                    normal,
                    uv: [u, v],
                });
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;

                // Degenerate triangles at the poles are skipped
                if ring != 0 {
                    indices.extend_from_slice(&[a, b, a + 1]);
                }
                if ring != rings - 1 {
                    indices.extend_from_slice(&[a + 1, b, b + 1]);
                }
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn vertices_lie_on_unit_sphere() {
        let mesh = SphereMesh::uv_sphere(32, 32);
        for vertex in &mesh.vertices {
            let len = Vec3::from(vertex.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex off sphere: {len}");
            assert_eq!(vertex.position, vertex.normal);
        }
    }

    #[test]
    fn indices_are_in_range_and_form_triangles() {
        let mesh = SphereMesh::uv_sphere(16, 8);
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        // Two triangles per quad minus one per quad on each polar ring
        assert_eq!(mesh.indices.len() as u32, 16 * (2 * 8 - 2) * 3);
    }

    #[test]
    fn triangles_wind_outward() {
        let mesh = SphereMesh::uv_sphere(12, 6);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "inward-facing triangle {tri:?}");
        }
    }

    #[test]
    fn tiny_requests_are_raised_to_a_valid_minimum() {
        let mesh = SphereMesh::uv_sphere(0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert!(!mesh.indices.is_empty());
    }
}
