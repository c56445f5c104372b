//! Host collaborator traits

use crate::{mesh::*, modifier::ModifierStack, object::*, Result};

/// Access to an externally owned scene.
///
/// Every accessor may fail: a host in a conflicting edit state answers with
/// [`Error::HostStateConflict`](crate::Error::HostStateConflict), anything else
/// with [`Error::UnexpectedHostFailure`](crate::Error::UnexpectedHostFailure).
pub trait Scene {
    /// All objects, in collection order
    fn object_ids(&self) -> Vec<ObjectId>;

    /// All mesh datablocks, in collection order
    fn mesh_ids(&self) -> Vec<MeshId>;

    fn object(&self, id: ObjectId) -> Result<&Object>;

    fn mesh(&self, id: MeshId) -> Result<&Mesh>;

    /// Mutable access to a mesh's geometry and UV layers
    fn mesh_mut(&mut self, id: MeshId) -> Result<&mut Mesh>;

    /// Mutable access to an object's modifier stack
    fn modifiers_mut(&mut self, id: ObjectId) -> Result<&mut ModifierStack>;

    /// Ids of `Mesh` objects, in collection order
    fn mesh_object_ids(&self) -> Result<Vec<ObjectId>> {
        let mut ids = Vec::new();
        for id in self.object_ids() {
            if self.object(id)?.is_mesh() {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
