//! UV unwrap candidate selection

use modelprep_core::{Mesh, PipelineConfig};
use tracing::debug;

/// Outcome of classifying one mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvDecision {
    /// The mesh needs a fresh unwrap; `layers_removed` old layers were destroyed first
    NeedsUnwrap { layers_removed: usize },
    /// The mesh keeps its existing UV layers
    Skip,
}

impl UvDecision {
    pub fn needs_unwrap(&self) -> bool {
        matches!(self, UvDecision::NeedsUnwrap { .. })
    }
}

/// Decides which meshes need a UV unwrap
#[derive(Debug, Clone, Copy, Default)]
pub struct UvCandidateSelector {
    /// Destroy existing UV layers and unwrap every mesh
    pub delete_existing: bool,
}

impl UvCandidateSelector {
    pub fn new(delete_existing: bool) -> Self {
        Self { delete_existing }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.delete_uv_maps())
    }

    /// Whether [`prepare`](Self::prepare) would modify this mesh
    pub fn needs_mutation(&self, mesh: &Mesh) -> bool {
        self.delete_existing && mesh.has_uv_layers()
    }

    /// Classify without touching the mesh
    pub fn classify(&self, mesh: &Mesh) -> UvDecision {
        if self.delete_existing || !mesh.has_uv_layers() {
            UvDecision::NeedsUnwrap {
                layers_removed: 0,
            }
        } else {
            UvDecision::Skip
        }
    }

    /// Destroy existing layers when requested, then classify
    pub fn prepare(&self, mesh: &mut Mesh) -> UvDecision {
        if !self.needs_mutation(mesh) {
            return self.classify(mesh);
        }
        let layers_removed = mesh.clear_uv_layers();
        debug!(mesh = %mesh.name, layers_removed, "removed UV layers");
        UvDecision::NeedsUnwrap { layers_removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelprep_core::{MeshId, Point3};

    fn mesh_with_layers(layers: usize) -> Mesh {
        let mut mesh = Mesh::from_vertices_and_faces(
            MeshId(0),
            "tri",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        for i in 0..layers {
            mesh.add_uv_layer(format!("UVMap.{:03}", i));
        }
        mesh
    }

    #[test]
    fn test_no_layers_needs_unwrap() {
        let selector = UvCandidateSelector::new(false);
        let mut mesh = mesh_with_layers(0);
        assert!(!selector.needs_mutation(&mesh));
        assert_eq!(
            selector.prepare(&mut mesh),
            UvDecision::NeedsUnwrap { layers_removed: 0 }
        );
    }

    #[test]
    fn test_existing_layers_skipped() {
        let selector = UvCandidateSelector::new(false);
        let mut mesh = mesh_with_layers(1);
        let before = mesh.clone();
        assert_eq!(selector.prepare(&mut mesh), UvDecision::Skip);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_delete_existing_destroys_layers() {
        let selector = UvCandidateSelector::new(true);
        let mut mesh = mesh_with_layers(2);
        assert!(selector.needs_mutation(&mesh));
        assert_eq!(
            selector.prepare(&mut mesh),
            UvDecision::NeedsUnwrap { layers_removed: 2 }
        );
        assert!(!mesh.has_uv_layers());
        assert!(selector.prepare(&mut mesh).needs_unwrap());
    }
}
