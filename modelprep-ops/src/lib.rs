//! Per-mesh preparation operations
//!
//! Each component here works on a single mesh or modifier stack and knows
//! nothing about batches:
//! - Vertex welding within a distance tolerance
//! - Decimate modifier lifecycle management
//! - Decimation planning (ratio validation, symmetry axis resolution)
//! - UV unwrap candidate selection

pub mod decimate;
pub mod modifiers;
pub mod uv;
pub mod weld;

pub use decimate::*;
pub use modifiers::*;
pub use uv::*;
pub use weld::*;
