//! Geometry for the renderer.
//!
//! Solid meshes are flat-shaded (one normal per face) and packed into one
//! vertex/index buffer. Wireframes are line segments that get transformed on
//! the CPU each frame. There are only a few hundred of them.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::scene::SceneFrame;

/// Segments per emblem ring.
const RING_SEGMENTS: u32 = 64;
/// Opacity of the grid floor lines.
const GRID_ALPHA: f32 = 0.6;

/// Vertex of a solid mesh.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertex of a world-space line.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Location of one mesh inside the packed buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRange {
    pub base_vertex: i32,
    pub first_index: u32,
    pub index_count: u32,
}

impl MeshRange {
    #[inline]
    pub fn indices(&self) -> std::ops::Range<u32> {
        self.first_index..self.first_index + self.index_count
    }
}

/// All solid meshes packed into shared buffers.
#[derive(Debug, Clone)]
pub struct MeshAtlas {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
    /// AI particles.
    pub cube: MeshRange,
    /// HUMAN particles.
    pub octahedron: MeshRange,
    /// Emblem core.
    pub icosahedron: MeshRange,
    /// Far-edge mask.
    pub quad: MeshRange,
}

impl MeshAtlas {
    pub fn new() -> Self {
        let mut atlas = Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            cube: MeshRange {
                base_vertex: 0,
                first_index: 0,
                index_count: 0,
            },
            octahedron: MeshRange {
                base_vertex: 0,
                first_index: 0,
                index_count: 0,
            },
            icosahedron: MeshRange {
                base_vertex: 0,
                first_index: 0,
                index_count: 0,
            },
            quad: MeshRange {
                base_vertex: 0,
                first_index: 0,
                index_count: 0,
            },
        };
        atlas.cube = atlas.push_faces(&cube_faces());
        atlas.octahedron = atlas.push_faces(&octahedron_faces());
        atlas.icosahedron = atlas.push_faces(&icosahedron_faces());
        atlas.quad = atlas.push_faces(&[
            [
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
            ],
            [
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
        ]);
        atlas
    }

    /// Append flat-shaded triangles; each gets its own three vertices.
    fn push_faces(&mut self, faces: &[[Vec3; 3]]) -> MeshRange {
        let range = MeshRange {
            base_vertex: self.vertices.len() as i32,
            first_index: self.indices.len() as u32,
            index_count: (faces.len() * 3) as u32,
        };

        for (i, [a, b, c]) in faces.iter().enumerate() {
            let normal = (*b - *a).cross(*c - *a).normalize_or_zero();
            for corner in [a, b, c] {
                self.vertices.push(MeshVertex {
                    position: corner.to_array(),
                    normal: normal.to_array(),
                });
            }
            let base = (i * 3) as u16;
            self.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        range
    }
}

impl Default for MeshAtlas {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit cube as 12 counter-clockwise triangles.
fn cube_faces() -> Vec<[Vec3; 3]> {
    let s = 0.5;
    let v = |x: f32, y: f32, z: f32| Vec3::new(x * s, y * s, z * s);
    let quads = [
        // +x
        [v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.), v(1., -1., 1.)],
        // -x
        [v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.), v(-1., -1., -1.)],
        // +y
        [v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.), v(-1., 1., -1.)],
        // -y
        [v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.), v(-1., -1., 1.)],
        // +z
        [v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.)],
        // -z
        [v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
    ];
    quads
        .iter()
        .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
        .collect()
}

/// Octahedron with vertices on the axes at distance 0.5.
fn octahedron_faces() -> Vec<[Vec3; 3]> {
    let s = 0.5;
    let (px, nx) = (Vec3::X * s, Vec3::NEG_X * s);
    let (py, ny) = (Vec3::Y * s, Vec3::NEG_Y * s);
    let (pz, nz) = (Vec3::Z * s, Vec3::NEG_Z * s);
    vec![
        [px, py, pz],
        [pz, py, nx],
        [nx, py, nz],
        [nz, py, px],
        [pz, ny, px],
        [nx, ny, pz],
        [nz, ny, nx],
        [px, ny, nz],
    ]
}

/// The 12 vertices of a unit-radius icosahedron.
fn icosahedron_vertices() -> [Vec3; 12] {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ]
    .map(Vec3::normalize)
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_faces() -> Vec<[Vec3; 3]> {
    let v = icosahedron_vertices();
    ICOSAHEDRON_FACES
        .iter()
        .map(|[a, b, c]| [v[*a], v[*b], v[*c]])
        .collect()
}

/// The 30 unique edges of the unit icosahedron.
fn icosahedron_edges() -> Vec<(Vec3, Vec3)> {
    let v = icosahedron_vertices();
    let mut edges: Vec<(usize, usize)> = ICOSAHEDRON_FACES
        .iter()
        .flat_map(|[a, b, c]| [(*a, *b), (*b, *c), (*c, *a)])
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();
    edges.sort_unstable();
    edges.dedup();
    edges.into_iter().map(|(a, b)| (v[a], v[b])).collect()
}

/// Builds the per-frame line list: grid floor, emblem shell and rings.
#[derive(Debug, Clone)]
pub struct LineBatch {
    vertices: Vec<LineVertex>,
    shell_edges: Vec<(Vec3, Vec3)>,
    ring_points: Vec<Vec3>,
}

impl LineBatch {
    pub fn new() -> Self {
        let ring_points = (0..=RING_SEGMENTS)
            .map(|i| {
                let angle = i as f32 / RING_SEGMENTS as f32 * TAU;
                Vec3::new(angle.cos(), 0.0, angle.sin())
            })
            .collect();

        Self {
            vertices: Vec::new(),
            shell_edges: icosahedron_edges(),
            ring_points,
        }
    }

    /// Rebuild the batch for `scene`. Reuses the previous allocation.
    pub fn rebuild(&mut self, scene: &SceneFrame) -> &[LineVertex] {
        self.vertices.clear();
        self.push_grid(scene);

        let shell_color = Vec3::from(scene.emblem.shell_color).extend(0.8);
        for i in 0..self.shell_edges.len() {
            let (a, b) = self.shell_edges[i];
            self.push_line(&scene.shell, a, b, shell_color);
        }

        let ring_color = Vec3::from(scene.emblem.ring_color).extend(0.9);
        for ring in &scene.rings {
            for pair in self.ring_points.windows(2) {
                push_segment(&mut self.vertices, ring, pair[0], pair[1], ring_color);
            }
        }

        &self.vertices
    }

    #[inline]
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    fn push_line(&mut self, model: &Mat4, a: Vec3, b: Vec3, color: Vec4) {
        push_segment(&mut self.vertices, model, a, b, color);
    }

    /// Lines across x scroll toward +z by the grid offset; lines along z stay put.
    fn push_grid(&mut self, scene: &SceneFrame) {
        let grid = &scene.grid;
        let half = grid.half_extent;
        let y = grid.height;
        let color = Vec3::from(grid.color).extend(GRID_ALPHA);
        let cells = (2.0 * half / grid.period).floor() as u32;

        for k in 0..=cells {
            let z = -half + k as f32 * grid.period + scene.grid_offset;
            if z <= half {
                push_segment(
                    &mut self.vertices,
                    &Mat4::IDENTITY,
                    Vec3::new(-half, y, z),
                    Vec3::new(half, y, z),
                    color,
                );
            }
            let x = -half + k as f32 * grid.period;
            push_segment(
                &mut self.vertices,
                &Mat4::IDENTITY,
                Vec3::new(x, y, -half),
                Vec3::new(x, y, half),
                color,
            );
        }
    }
}

impl Default for LineBatch {
    fn default() -> Self {
        Self::new()
    }
}

fn push_segment(out: &mut Vec<LineVertex>, model: &Mat4, a: Vec3, b: Vec3, color: Vec4) {
    let color = color.to_array();
    for p in [a, b] {
        out.push(LineVertex {
            position: model.transform_point3(p).to_array(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::scene::Scene;

    #[test]
    fn test_atlas_ranges() {
        let atlas = MeshAtlas::new();
        assert_eq!(atlas.cube.index_count, 36);
        assert_eq!(atlas.octahedron.index_count, 24);
        assert_eq!(atlas.icosahedron.index_count, 60);
        assert_eq!(atlas.quad.index_count, 6);
        assert_eq!(atlas.vertices.len(), 36 + 24 + 60 + 6);
        assert_eq!(atlas.indices.len(), atlas.vertices.len());
        assert_eq!(atlas.octahedron.base_vertex, 36);
        assert_eq!(atlas.quad.indices(), 120..126);
    }

    #[test]
    fn test_normals_point_outward() {
        let atlas = MeshAtlas::new();
        let closed = [atlas.cube, atlas.octahedron, atlas.icosahedron];
        for range in closed {
            let start = range.base_vertex as usize;
            let end = start + range.index_count as usize;
            for tri in atlas.vertices[start..end].chunks(3) {
                let centroid = tri
                    .iter()
                    .map(|v| Vec3::from(v.position))
                    .sum::<Vec3>()
                    / 3.0;
                let normal = Vec3::from(tri[0].normal);
                assert!(normal.dot(centroid) > 0.0, "inward face at {:?}", centroid);
            }
        }
    }

    #[test]
    fn test_icosahedron_has_thirty_edges() {
        let edges = icosahedron_edges();
        assert_eq!(edges.len(), 30);
        for (a, b) in edges {
            assert!((a.length() - 1.0).abs() < 1e-5);
            assert!((b.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_line_batch_stays_within_grid() {
        let scene = Scene::new(&SceneConfig::default());
        let mut batch = LineBatch::new();
        let half = SceneConfig::default().grid.half_extent;

        for i in 0..20 {
            let frame = scene.frame(i as f32 * 0.13);
            let vertices = batch.rebuild(&frame);
            assert_eq!(vertices.len() % 2, 0);
            for v in vertices.iter().filter(|v| v.position[1] == frame.grid.height) {
                assert!(v.position[2] >= -half - 1e-4 && v.position[2] <= half + 1e-4);
            }
        }
    }

    #[test]
    fn test_line_batch_reuses_allocation() {
        let scene = Scene::new(&SceneConfig::default());
        let mut batch = LineBatch::new();
        batch.rebuild(&scene.frame(0.0));
        let capacity = batch.vertices.capacity();
        for i in 1..10 {
            batch.rebuild(&scene.frame(i as f32));
        }
        assert_eq!(batch.vertices.capacity(), capacity);
    }
}
