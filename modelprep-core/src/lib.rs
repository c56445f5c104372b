//! Core data structures and traits for modelprep
//!
//! This crate provides the scene model the preparation pipeline operates on:
//! meshes with UV layers, objects with modifier stacks, the [`Scene`] trait a
//! host implements, an in-memory [`MemoryScene`], the validated
//! [`PipelineConfig`] and the shared error taxonomy.

pub mod config;
pub mod error;
pub mod mesh;
pub mod modifier;
pub mod object;
pub mod point;
pub mod scene;
pub mod traits;

pub use config::*;
pub use error::*;
pub use mesh::*;
pub use modifier::*;
pub use object::*;
pub use point::*;
pub use scene::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector3};
