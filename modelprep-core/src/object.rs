//! Scene objects

use crate::mesh::MeshId;
use crate::modifier::ModifierStack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an object within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Host type tag of an object. Only `Mesh` objects are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Mesh,
    Curve,
    Camera,
    Light,
    Empty,
}

/// Interaction mode of an object in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObjectMode {
    #[default]
    Object,
    /// Being edited interactively; the host refuses data mutation
    Edit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    /// Mesh datablock; may be shared with other objects
    #[serde(default)]
    pub mesh: Option<MeshId>,
    #[serde(default)]
    pub modifiers: ModifierStack,
    #[serde(default)]
    pub mode: ObjectMode,
}

impl Object {
    /// A mesh object in object mode with an empty modifier stack
    pub fn with_mesh(id: ObjectId, name: impl Into<String>, mesh: MeshId) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ObjectKind::Mesh,
            mesh: Some(mesh),
            modifiers: ModifierStack::new(),
            mode: ObjectMode::Object,
        }
    }

    /// An object of a non-mesh kind
    pub fn without_mesh(id: ObjectId, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            mesh: None,
            modifiers: ModifierStack::new(),
            mode: ObjectMode::Object,
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh
    }

    pub fn is_editing(&self) -> bool {
        self.mode == ObjectMode::Edit
    }
}
