//! Physics module for collision detection
//!
//! Bounding volumes with a sphere pre-test and an oriented-box separating
//! axis test, plus the per-step pass that drives them.

pub mod bounding_volume;
pub mod collision_system;
pub mod sat;

pub use bounding_volume::{BoundingSphere, BoundingVolume, VolumeId};
pub use collision_system::{CollisionConfig, CollisionPair, CollisionSystem};
pub use sat::{OrientedBox, SatVariant, SeparatingAxis};
