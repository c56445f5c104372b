//! In-memory scene

use crate::error::{Error, Result};
use crate::mesh::*;
use crate::modifier::ModifierStack;
use crate::object::*;
use crate::traits::Scene;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A scene held entirely in memory, loadable from and savable to JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryScene {
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub objects: Vec<Object>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh datablock, assigning the next free id
    pub fn add_mesh(&mut self, mut mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.iter().map(|m| m.id.0 + 1).max().unwrap_or(0));
        mesh.id = id;
        self.meshes.push(mesh);
        id
    }

    /// Add an object, assigning the next free id
    pub fn add_object(&mut self, mut object: Object) -> ObjectId {
        let id = ObjectId(self.objects.iter().map(|o| o.id.0 + 1).max().unwrap_or(0));
        object.id = id;
        self.objects.push(object);
        id
    }

    /// Add a mesh together with a mesh object that owns it
    pub fn add_mesh_object(&mut self, name: &str, mesh: Mesh) -> ObjectId {
        let mesh_id = self.add_mesh(mesh);
        self.add_object(Object::with_mesh(ObjectId(0), name, mesh_id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| Error::UnexpectedHostFailure(format!("no {} in scene", id)))
    }

    /// Check id uniqueness, mesh references and mesh geometry
    pub fn validate(&self) -> Result<()> {
        let mut mesh_ids = HashSet::new();
        for mesh in &self.meshes {
            if !mesh_ids.insert(mesh.id) {
                return Err(Error::InvalidParameter(format!("duplicate {}", mesh.id)));
            }
            mesh.validate()?;
        }
        let mut object_ids = HashSet::new();
        for object in &self.objects {
            if !object_ids.insert(object.id) {
                return Err(Error::InvalidParameter(format!("duplicate {}", object.id)));
            }
            match object.mesh {
                Some(mesh) if !mesh_ids.contains(&mesh) => {
                    return Err(Error::InvalidParameter(format!(
                        "{} ('{}') references missing {}",
                        object.id, object.name, mesh
                    )));
                }
                None if object.is_mesh() => {
                    return Err(Error::InvalidParameter(format!(
                        "mesh {} ('{}') has no mesh data",
                        object.id, object.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Load and validate a scene from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scene: MemoryScene = serde_json::from_str(&text)?;
        scene.validate()?;
        debug!(
            path = %path.display(),
            meshes = scene.meshes.len(),
            objects = scene.objects.len(),
            "scene loaded"
        );
        Ok(scene)
    }

    /// Write the scene as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

impl Scene for MemoryScene {
    fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    fn mesh_ids(&self) -> Vec<MeshId> {
        self.meshes.iter().map(|m| m.id).collect()
    }

    fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| Error::UnexpectedHostFailure(format!("no {} in scene", id)))
    }

    fn mesh(&self, id: MeshId) -> Result<&Mesh> {
        self.meshes
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::UnexpectedHostFailure(format!("no {} in scene", id)))
    }

    fn mesh_mut(&mut self, id: MeshId) -> Result<&mut Mesh> {
        if let Some(editing) = self
            .objects
            .iter()
            .find(|o| o.mesh == Some(id) && o.is_editing())
        {
            return Err(Error::HostStateConflict(format!(
                "{} is being edited through '{}'",
                id, editing.name
            )));
        }
        self.meshes
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::UnexpectedHostFailure(format!("no {} in scene", id)))
    }

    fn modifiers_mut(&mut self, id: ObjectId) -> Result<&mut ModifierStack> {
        let object = self.object_mut(id)?;
        if object.is_editing() {
            return Err(Error::HostStateConflict(format!(
                "cannot change modifiers of '{}' while it is in edit mode",
                object.name
            )));
        }
        Ok(&mut object.modifiers)
    }
}
