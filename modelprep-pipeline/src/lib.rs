//! Batch orchestration for modelprep
//!
//! Drives the per-mesh operations of `modelprep-ops` across every eligible
//! mesh or object of a [`Scene`](modelprep_core::Scene):
//! - Weld: remove doubles on every mesh datablock
//! - Decimate / Undecimate: manage decimate modifiers on mesh objects
//! - UV select: pick mesh objects needing an unwrap and hand them to a [`UvUnwrapper`]
//!
//! Batches are fail-fast and non-transactional: the first host error stops
//! the walk and the [`BatchResult`] reports how far it got.

pub mod orchestrator;
pub mod result;
pub mod unwrap;

pub use orchestrator::*;
pub use result::*;
pub use unwrap::*;
