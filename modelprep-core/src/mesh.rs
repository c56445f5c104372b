//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a mesh datablock within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshId(pub usize);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// A stored texture-coordinate mapping.
///
/// `corners[f][c]` is the coordinate of corner `c` of face `f`, so a layer is
/// always aligned with the owning mesh's `faces`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvLayer {
    pub name: String,
    pub corners: Vec<Vec<Point2f>>,
}

impl UvLayer {
    /// Create a layer with every corner of `faces` mapped to the origin
    pub fn zeroed(name: impl Into<String>, faces: &[Vec<usize>]) -> Self {
        Self {
            name: name.into(),
            corners: faces
                .iter()
                .map(|face| vec![Point2f::origin(); face.len()])
                .collect(),
        }
    }
}

/// A polygon mesh with vertices, loose edges, faces and UV layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub id: MeshId,
    pub name: String,
    pub vertices: Vec<Point3f>,
    #[serde(default)]
    pub edges: Vec<[usize; 2]>,
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
    #[serde(default)]
    pub uv_layers: Vec<UvLayer>,
}

/// Area of the polygon `face` over `vertices`, using Newell's method.
///
/// Accumulates in f64 so faces at very small scales keep a non-zero area.
pub fn polygon_area(vertices: &[Point3f], face: &[usize]) -> f64 {
    if face.len() < 3 {
        return 0.0;
    }
    let mut normal = Vector3::<f64>::zeros();
    for (i, &a) in face.iter().enumerate() {
        let b = face[(i + 1) % face.len()];
        let p = vertices[a].cast::<f64>();
        let q = vertices[b].cast::<f64>();
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.norm() * 0.5
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(id: MeshId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            uv_layers: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(
        id: MeshId,
        name: impl Into<String>,
        vertices: Vec<Point3f>,
        faces: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            vertices,
            edges: Vec::new(),
            faces,
            uv_layers: Vec::new(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh. Existing UV layers get zeroed corners for it.
    pub fn add_face(&mut self, face: Vec<usize>) {
        for layer in &mut self.uv_layers {
            layer.corners.push(vec![Point2f::origin(); face.len()]);
        }
        self.faces.push(face);
    }

    /// Add an empty UV layer covering every face corner
    pub fn add_uv_layer(&mut self, name: impl Into<String>) -> &mut UvLayer {
        let layer = UvLayer::zeroed(name, &self.faces);
        self.uv_layers.push(layer);
        let last = self.uv_layers.len() - 1;
        &mut self.uv_layers[last]
    }

    pub fn has_uv_layers(&self) -> bool {
        !self.uv_layers.is_empty()
    }

    /// Destroy every UV layer, returning how many were removed
    pub fn clear_uv_layers(&mut self) -> usize {
        let removed = self.uv_layers.len();
        self.uv_layers.clear();
        removed
    }

    /// Axis-aligned bounds of the vertices, `None` for an empty mesh
    pub fn bounding_box(&self) -> Option<(Point3f, Point3f)> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;

        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        Some((min, max))
    }

    /// Length of the bounding box diagonal (0 for empty or single-point meshes)
    pub fn bounding_diagonal(&self) -> f32 {
        self.bounding_box()
            .map(|(min, max)| (max - min).norm())
            .unwrap_or(0.0)
    }

    /// Area of a polygon given as vertex indices
    pub fn face_area(&self, face: &[usize]) -> f32 {
        polygon_area(&self.vertices, face) as f32
    }

    /// Check that every edge, face and UV layer is consistent with the vertex list
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        for (ei, edge) in self.edges.iter().enumerate() {
            if edge.iter().any(|&v| v >= n) {
                return Err(Error::InvalidParameter(format!(
                    "{}: edge {} references a vertex out of range ({} vertices)",
                    self.name, ei, n
                )));
            }
        }
        for (fi, face) in self.faces.iter().enumerate() {
            if face.iter().any(|&v| v >= n) {
                return Err(Error::InvalidParameter(format!(
                    "{}: face {} references a vertex out of range ({} vertices)",
                    self.name, fi, n
                )));
            }
        }
        for layer in &self.uv_layers {
            let aligned = layer.corners.len() == self.faces.len()
                && layer
                    .corners
                    .iter()
                    .zip(&self.faces)
                    .all(|(uvs, face)| uvs.len() == face.len());
            if !aligned {
                return Err(Error::InvalidParameter(format!(
                    "{}: UV layer '{}' is not aligned with the face corners",
                    self.name, layer.name
                )));
            }
        }
        Ok(())
    }
}
