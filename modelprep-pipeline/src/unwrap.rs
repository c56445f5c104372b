//! External UV unwrap collaborator

use modelprep_core::{ObjectId, Result, Scene, UvUnwrapParams};

/// A UV unwrap routine supplied by the host.
///
/// It is called once per batch with every selected object, never per object.
pub trait UvUnwrapper<S: Scene + ?Sized> {
    fn smart_project(
        &mut self,
        scene: &mut S,
        objects: &[ObjectId],
        params: &UvUnwrapParams,
    ) -> Result<()>;
}
