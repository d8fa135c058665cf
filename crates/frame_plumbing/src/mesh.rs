use bevy_math::Vec3;
use bytemuck::Pod;
use bytemuck::Zeroable;

/// Cube vertex: position then texture coordinate. Normals come from the geometry shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl TexturedVertex {
    pub const TEX_COORD_OFFSET: u32 = 12;
}

/// Polygon vertex: position then normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct NormalVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl NormalVertex {
    pub const NORMAL_OFFSET: u32 = 12;
}

/// Indexed cube mesh centered on the origin.
#[derive(Debug, Clone)]
pub struct IndexedMesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u16>,
}

/// Builds a cube with four vertices per face so each face carries its own texture coordinates.
///
/// Triangles wind clockwise when seen from outside, Direct3D's default front face.
pub fn cube(half_extent: f32) -> IndexedMesh<TexturedVertex> {
    // (outward normal, one in-plane axis)
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z),
        (Vec3::Y, Vec3::Z),
        (Vec3::NEG_Y, Vec3::X),
        (Vec3::Z, Vec3::X),
        (Vec3::NEG_Z, Vec3::Y),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, a) in faces {
        // cross(a, b) == normal
        let b = normal.cross(a);
        let corners = [
            (normal - a - b, [0.0, 1.0]),
            (normal + a - b, [1.0, 1.0]),
            (normal + a + b, [1.0, 0.0]),
            (normal - a + b, [0.0, 0.0]),
        ];
        let base = vertices.len() as u16;
        for (corner, tex_coord) in corners {
            vertices.push(TexturedVertex {
                position: (corner * half_extent).to_array(),
                tex_coord,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    IndexedMesh { vertices, indices }
}

/// The triangle every polygon instance shares, wound clockwise toward -Z.
pub const POLYGON_CORNERS: [[f32; 3]; 3] = [[0.0, 0.25, 0.0], [0.22, -0.15, 0.0], [-0.22, -0.15, 0.0]];

/// A flat-shaded triangle with its face normal on every vertex.
pub fn polygon(corners: [[f32; 3]; 3]) -> [NormalVertex; 3] {
    let [p0, p1, p2] = corners.map(Vec3::from_array);
    let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero().to_array();
    corners.map(|position| NormalVertex { position, normal })
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use super::*;

    #[test]
    fn vertex_offsets_match_input_layouts() {
        assert_eq!(
            offset_of!(TexturedVertex, tex_coord) as u32,
            TexturedVertex::TEX_COORD_OFFSET
        );
        assert_eq!(offset_of!(NormalVertex, normal) as u32, NormalVertex::NORMAL_OFFSET);
        assert_eq!(std::mem::size_of::<TexturedVertex>(), 20);
        assert_eq!(std::mem::size_of::<NormalVertex>(), 24);
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let mesh = cube(0.5);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn cube_triangles_face_outward() {
        let mesh = cube(1.0);
        for triangle in mesh.indices.chunks(3) {
            let [p0, p1, p2] =
                [0, 1, 2].map(|k| Vec3::from_array(mesh.vertices[triangle[k] as usize].position));
            let facing = (p1 - p0).cross(p2 - p0);
            let centroid = (p0 + p1 + p2) / 3.0;
            assert!(facing.dot(centroid) > 0.0, "triangle {triangle:?} winds inward");
        }
    }

    #[test]
    fn polygon_normal_faces_the_camera() {
        let vertices = polygon(POLYGON_CORNERS);
        for vertex in vertices {
            let normal = Vec3::from_array(vertex.normal);
            assert!(
                (normal - Vec3::NEG_Z).length() < 1e-6,
                "normal {normal:?} does not face the camera"
            );
        }
    }
}
