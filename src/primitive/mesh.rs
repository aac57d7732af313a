//! Indexed triangle meshes for 3D primitives.

use std::path::Path;

use crate::colors::pack_color;
use crate::error::ResourceError;
use crate::math::{Aabb3, Vec3};

/// Parallel vertex, normal and color arrays plus triangle indices.
///
/// The color array always has one entry per vertex: missing entries are
/// filled with a fill color and surplus ones dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonMesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<u32>,
    indices: Vec<[u32; 3]>,
}

fn fit_colors(colors: &mut Vec<u32>, len: usize, fill: u32) {
    colors.resize(len, fill);
}

impl PolygonMesh {
    /// Builds a mesh; indices that point past the vertex array are dropped.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>, colors: Vec<u32>, fill: u32) -> Self {
        let count = vertices.len() as u32;
        let indices: Vec<[u32; 3]> = indices
            .into_iter()
            .filter(|face| face.iter().all(|&i| i < count))
            .collect();
        let mut mesh = Self {
            vertices,
            normals: Vec::new(),
            colors,
            indices,
        };
        fit_colors(&mut mesh.colors, mesh.vertices.len(), fill);
        mesh.normals = mesh.compute_vertex_normals();
        mesh
    }

    /// An axis-aligned cube of edge `size` centred on the origin, wound so its
    /// faces point outwards.
    pub fn cube(size: f32, color: u32) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, h),
            Vec3::new(h, -h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, -h, h),
        ];
        let indices = vec![
            [0, 1, 2],
            [0, 2, 3], // front (-z)
            [3, 2, 4],
            [3, 4, 5], // right
            [5, 4, 6],
            [5, 6, 7], // back
            [7, 6, 1],
            [7, 1, 0], // left
            [1, 6, 4],
            [1, 4, 2], // top
            [5, 7, 0],
            [5, 0, 3], // bottom
        ];
        Self::new(vertices, indices, Vec::new(), color)
    }

    /// Loads every model of an OBJ file into one mesh.
    ///
    /// Vertex colors from the file are used when present; otherwise `fill`.
    pub fn from_obj(path: impl AsRef<Path>, fill: u32) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|source| ResourceError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let mut vertices = Vec::new();
        let mut colors = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            vertices.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
            if mesh.vertex_color.len() == mesh.positions.len() {
                colors.extend(
                    mesh.vertex_color
                        .chunks_exact(3)
                        .map(|c| pack_color(c[0], c[1], c[2], 1.0)),
                );
            } else {
                colors.resize(vertices.len(), fill);
            }
            indices.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| [base + f[0], base + f[1], base + f[2]]),
            );
        }

        if indices.is_empty() {
            return Err(ResourceError::EmptyMesh {
                path: path.to_path_buf(),
            });
        }
        log::debug!(
            "loaded {} ({} models, {} vertices, {} triangles)",
            path.display(),
            models.len(),
            vertices.len(),
            indices.len()
        );
        Ok(Self::new(vertices, indices, colors, fill))
    }

    // ============ Accessors ============

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn extent(&self) -> Aabb3 {
        Aabb3::from_points(self.vertices.iter())
    }

    /// Vertex positions and colors of triangle `index`.
    pub fn triangle(&self, index: usize) -> Option<([Vec3; 3], [u32; 3])> {
        let [a, b, c] = *self.indices.get(index)?;
        let (a, b, c) = (a as usize, b as usize, c as usize);
        Some((
            [self.vertices[a], self.vertices[b], self.vertices[c]],
            [self.colors[a], self.colors[b], self.colors[c]],
        ))
    }

    // ============ Mutators ============

    /// Replaces the vertices, refitting colors with `fill`.
    pub fn set_vertices(&mut self, vertices: Vec<Vec3>, fill: u32) {
        let count = vertices.len() as u32;
        self.vertices = vertices;
        self.indices.retain(|face| face.iter().all(|&i| i < count));
        fit_colors(&mut self.colors, self.vertices.len(), fill);
        self.normals = self.compute_vertex_normals();
    }

    pub fn set_colors(&mut self, colors: Vec<u32>, fill: u32) {
        self.colors = colors;
        fit_colors(&mut self.colors, self.vertices.len(), fill);
    }

    pub fn set_vertex_color(&mut self, index: usize, color: u32) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    /// Paints every vertex with `color`.
    pub fn fill_colors(&mut self, color: u32) {
        self.colors.fill(color);
    }

    /// Area-weighted average of adjacent face normals.
    fn compute_vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for face in &self.indices {
            let [a, b, c] = face.map(|i| self.vertices[i as usize]);
            let n = (b - a).cross(c - a);
            for &i in face {
                normals[i as usize] = normals[i as usize] + n;
            }
        }
        normals.iter().map(Vec3::normalize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{RED, WHITE};

    fn tri() -> Vec<Vec3> {
        vec![Vec3::ZERO, Vec3::RIGHT, Vec3::UP]
    }

    #[test]
    fn colors_padded_to_vertex_count() {
        let mesh = PolygonMesh::new(tri(), vec![[0, 1, 2]], vec![RED], WHITE);
        assert_eq!(mesh.colors(), &[RED, WHITE, WHITE]);
    }

    #[test]
    fn colors_truncated_to_vertex_count() {
        let mesh = PolygonMesh::new(tri(), vec![[0, 1, 2]], vec![RED; 5], WHITE);
        assert_eq!(mesh.colors().len(), 3);
    }

    #[test]
    fn mutators_keep_color_invariant() {
        let mut mesh = PolygonMesh::new(tri(), vec![[0, 1, 2]], Vec::new(), WHITE);
        let mut more = tri();
        more.push(Vec3::ONE);
        mesh.set_vertices(more, RED);
        assert_eq!(mesh.colors(), &[WHITE, WHITE, WHITE, RED]);
        mesh.set_colors(vec![RED], WHITE);
        assert_eq!(mesh.colors().len(), 4);
        mesh.set_vertices(tri()[..2].to_vec(), RED);
        assert_eq!(mesh.colors().len(), 2);
        // The triangle referenced a dropped vertex.
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn out_of_range_indices_dropped() {
        let mesh = PolygonMesh::new(tri(), vec![[0, 1, 2], [0, 1, 9]], Vec::new(), WHITE);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn cube_faces_point_outwards() {
        let cube = PolygonMesh::cube(2.0, WHITE);
        assert_eq!(cube.triangle_count(), 12);
        for i in 0..cube.triangle_count() {
            let ([a, b, c], _) = cube.triangle(i).unwrap();
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "face {} points inwards", i);
        }
    }

    #[test]
    fn missing_obj_errors() {
        let err = PolygonMesh::from_obj("/no/such/model.obj", WHITE).unwrap_err();
        assert!(matches!(err, ResourceError::Obj { .. }));
    }
}
