//! Vertex welding
//!
//! Merges every group of vertices connected through chains of pairwise
//! distances within the tolerance. Neighbor queries go through a uniform hash
//! grid anchored at the bounding-box minimum, so each vertex only inspects the
//! 27 cells around it; connected groups are tracked with a union-find whose
//! root is always the lowest vertex index of the group. Distances are measured
//! in f64 so tiny tolerances do not underflow.
//!
//! Each group collapses onto the position of its first vertex. Because the
//! surviving vertices belong to different groups they are all farther apart
//! than the tolerance, which makes a second pass with the same tolerance a
//! no-op.

use modelprep_core::{polygon_area, Error, Mesh, Point3, Point3f, Result, Vector3};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A merged face is dropped when its area is at most this fraction of its
/// longest edge squared
const DEGENERATE_RATIO: f64 = 1e-12;

/// Upper bound on grid cells along one axis
const GRID_RESOLUTION: f64 = 1_099_511_627_776.0; // 2^40

/// Vertex counts before and after a weld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeldReport {
    pub vertices_before: usize,
    pub vertices_after: usize,
}

impl WeldReport {
    pub fn removed(&self) -> usize {
        self.vertices_before - self.vertices_after
    }
}

/// Disjoint sets over vertex indices, rooted at the smallest index
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

type CellKey = (i64, i64, i64);

/// Uniform grid over the finite vertices. Cells are never smaller than the
/// tolerance, so a 27-cell neighborhood covers every candidate pair.
#[derive(Debug, Clone, Copy)]
struct CellGrid {
    origin: Point3<f64>,
    cell_size: f64,
}

impl CellGrid {
    fn new(origin: Point3<f64>, extent: Vector3<f64>, tolerance: f64) -> Self {
        let widest = extent.x.max(extent.y).max(extent.z);
        Self {
            origin,
            cell_size: tolerance.max(widest / GRID_RESOLUTION),
        }
    }

    fn cell(&self, p: &Point3<f64>) -> CellKey {
        let d = p - self.origin;
        (
            (d.x / self.cell_size).floor() as i64,
            (d.y / self.cell_size).floor() as i64,
            (d.z / self.cell_size).floor() as i64,
        )
    }
}

fn is_finite(p: &Point3f) -> bool {
    p.iter().all(|c| c.is_finite())
}

/// Welds spatially coincident vertices of a mesh
#[derive(Debug, Clone, Copy)]
pub struct VertexWelder {
    tolerance: f32,
}

impl VertexWelder {
    /// Create a welder; the tolerance must be finite and non-negative
    pub fn new(tolerance: f32) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "weld tolerance must be a finite value >= 0, got {}",
                tolerance
            )));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Weld `mesh` in place.
    ///
    /// The mesh is validated first; an inconsistent mesh is rejected with
    /// [`Error::InvalidParameter`] and left untouched.
    pub fn weld(&self, mesh: &mut Mesh) -> Result<WeldReport> {
        mesh.validate()?;
        let before = mesh.vertex_count();
        let unchanged = WeldReport {
            vertices_before: before,
            vertices_after: before,
        };

        if self.tolerance == 0.0 || before < 2 {
            return Ok(unchanged);
        }

        let roots = self.cluster_roots(&mesh.vertices);
        if roots.iter().enumerate().all(|(i, &r)| i == r) {
            debug!(mesh = %mesh.name, "no vertices within tolerance");
            return Ok(unchanged);
        }

        rebuild_mesh(mesh, &roots);

        let report = WeldReport {
            vertices_before: before,
            vertices_after: mesh.vertex_count(),
        };
        debug!(
            mesh = %mesh.name,
            removed = report.removed(),
            before,
            "welded vertices"
        );
        Ok(report)
    }

    /// For every vertex, the lowest index of the group it belongs to
    fn cluster_roots(&self, vertices: &[Point3f]) -> Vec<usize> {
        let n = vertices.len();
        let Some((min, max)) = finite_bounds(vertices) else {
            return (0..n).collect();
        };
        let tolerance = self.tolerance as f64;
        let extent = max - min;

        // Every pair is within the bounding diagonal, so everything merges.
        if vertices.iter().all(is_finite) && extent.norm() <= tolerance {
            return vec![0; n];
        }

        let grid = CellGrid::new(min, extent, tolerance);
        let tolerance_sq = tolerance * tolerance;
        let points: Vec<Point3<f64>> = vertices.iter().map(|v| v.cast::<f64>()).collect();

        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        for (vi, v) in vertices.iter().enumerate() {
            if is_finite(v) {
                cells.entry(grid.cell(&points[vi])).or_default().push(vi);
            }
        }

        let mut sets = UnionFind::new(n);
        for (vi, v) in vertices.iter().enumerate() {
            if !is_finite(v) {
                continue;
            }
            let p = points[vi];
            let (cx, cy, cz) = grid.cell(&p);
            for dx in -1i64..=1 {
                for dy in -1i64..=1 {
                    for dz in -1i64..=1 {
                        let Some(cell) = cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &other in cell {
                            if other > vi && (points[other] - p).norm_squared() <= tolerance_sq {
                                sets.union(vi, other);
                            }
                        }
                    }
                }
            }
        }

        (0..n).map(|vi| sets.find(vi)).collect()
    }
}

/// Bounds of the finite vertices in f64, `None` when there are none
fn finite_bounds(vertices: &[Point3f]) -> Option<(Point3<f64>, Point3<f64>)> {
    let mut finite = vertices.iter().filter(|v| is_finite(v)).map(|v| v.cast::<f64>());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(mut min, mut max), v| {
        for i in 0..3 {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
        (min, max)
    }))
}

/// Fewer than three distinct corners, or an area negligible against the face's own size
fn is_degenerate(vertices: &[Point3f], face: &[usize]) -> bool {
    let distinct: HashSet<usize> = face.iter().copied().collect();
    if distinct.len() < 3 {
        return true;
    }
    let longest_sq = face
        .iter()
        .zip(face.iter().cycle().skip(1))
        .map(|(&a, &b)| (vertices[a].cast::<f64>() - vertices[b].cast::<f64>()).norm_squared())
        .fold(0.0_f64, f64::max);
    polygon_area(vertices, face) <= DEGENERATE_RATIO * longest_sq
}

/// Collapse every group onto its root and re-point faces, edges and UVs
fn rebuild_mesh(mesh: &mut Mesh, roots: &[usize]) {
    let mut new_index = vec![usize::MAX; roots.len()];
    let mut vertices = Vec::new();
    for (vi, &root) in roots.iter().enumerate() {
        if root == vi {
            new_index[vi] = vertices.len();
            vertices.push(mesh.vertices[vi]);
        }
    }
    let remap: Vec<usize> = roots.iter().map(|&root| new_index[root]).collect();
    let merged = |v: usize| roots[v] != v;

    // Per surviving face: its old index and the corners that remain
    let mut kept_faces: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut changed: Vec<bool> = Vec::new();
    for (fi, face) in mesh.faces.iter().enumerate() {
        let mut corners: Vec<usize> = Vec::with_capacity(face.len());
        for (ci, &v) in face.iter().enumerate() {
            if corners.last().map(|&c| remap[face[c]]) != Some(remap[v]) {
                corners.push(ci);
            }
        }
        // The polygon is cyclic, so the last corner may also repeat the first
        while let (Some(&first), Some(&last)) = (corners.first(), corners.last()) {
            if corners.len() < 2 || remap[face[first]] != remap[face[last]] {
                break;
            }
            corners.pop();
        }
        kept_faces.push((fi, corners));
        changed.push(face.iter().any(|&v| merged(v)));
    }

    let new_face = |fi: usize, corners: &[usize]| -> Vec<usize> {
        corners.iter().map(|&c| remap[mesh.faces[fi][c]]).collect()
    };
    let face_key = |face: &[usize]| -> Vec<usize> {
        let mut key = face.to_vec();
        key.sort_unstable();
        key
    };

    let mut seen: HashSet<Vec<usize>> = kept_faces
        .iter()
        .filter(|(fi, _)| !changed[*fi])
        .map(|(fi, corners)| face_key(&new_face(*fi, corners)))
        .collect();

    kept_faces.retain(|(fi, corners)| {
        if !changed[*fi] {
            return true;
        }
        let face = new_face(*fi, corners);
        if is_degenerate(&vertices, &face) {
            return false;
        }
        seen.insert(face_key(&face))
    });

    let faces: Vec<Vec<usize>> = kept_faces
        .iter()
        .map(|(fi, corners)| new_face(*fi, corners))
        .collect();
    for layer in &mut mesh.uv_layers {
        layer.corners = kept_faces
            .iter()
            .map(|(fi, corners)| corners.iter().map(|&c| layer.corners[*fi][c]).collect())
            .collect();
    }

    let edge_key = |e: [usize; 2]| [e[0].min(e[1]), e[0].max(e[1])];
    let mut seen_edges: HashSet<[usize; 2]> = mesh
        .edges
        .iter()
        .filter(|e| !merged(e[0]) && !merged(e[1]))
        .map(|e| edge_key([remap[e[0]], remap[e[1]]]))
        .collect();
    let edges: Vec<[usize; 2]> = mesh
        .edges
        .iter()
        .filter_map(|e| {
            let mapped = [remap[e[0]], remap[e[1]]];
            if !merged(e[0]) && !merged(e[1]) {
                return Some(mapped);
            }
            if mapped[0] == mapped[1] || !seen_edges.insert(edge_key(mapped)) {
                return None;
            }
            Some(mapped)
        })
        .collect();

    mesh.vertices = vertices;
    mesh.faces = faces;
    mesh.edges = edges;
}
