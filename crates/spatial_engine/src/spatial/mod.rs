//! Spatial partitioning data structures
//!
//! Groups entities by the region of space they occupy so the collision pass
//! only tests objects that could possibly touch.

mod octree;

pub use octree::{OctantId, OctantNode, Octree, OctreeConfig, MAX_LEVEL_LIMIT};
