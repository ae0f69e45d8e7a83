//! # Spatial Engine
//!
//! Spatial partitioning and oriented-box collision detection for 3D scenes.
//!
//! ## Features
//!
//! - **Octree**: adaptive subdivision of the space enclosing every entity,
//!   leaf membership reported back to the entity registry
//! - **Bounding volumes**: local/world boxes, bounding sphere, oriented box
//!   derived from a model matrix
//! - **Collision**: sphere pre-test plus a 15-axis separating axis test,
//!   per-volume colliding sets, enter/exit tracking
//! - **Debug drawing**: wireframe spheres, boxes and octants through a
//!   render sink
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spatial_engine::prelude::*;
//!
//! let config = SimulationConfig::default();
//! config.init_logging();
//!
//! let cube = [Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)];
//! let mut entities = EntityManager::new();
//! let a = entities.add_entity("a", &cube);
//! let b = entities.add_entity("b", &cube);
//! entities.set_model_matrix(b, Transform::from_position(Vec3::new(0.4, 0.0, 0.0)).to_matrix());
//!
//! let octree = Octree::build(config.octree, &mut entities);
//! let mut collisions = CollisionSystem::new(config.collision);
//! collisions.detect_collisions(&mut entities);
//! assert!(collisions.is_pair_colliding(a, b));
//!
//! let mut visualizer = config.debug.visualizer();
//! visualizer.draw_volumes(&entities);
//! visualizer.draw_octree(&octree);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod debug;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, DebugConfig, SimulationConfig},
        debug::{CollisionDebugVisualizer, DebugDrawSystem, OctreeDisplay, RenderSink, VolumeVisibility},
        ecs::{Entity, EntityManager, EntityRegistry},
        foundation::{
            geometry::AABB,
            math::{Mat4, Quat, Transform, Vec3},
        },
        physics::{BoundingVolume, CollisionConfig, CollisionPair, CollisionSystem, SatVariant, VolumeId},
        spatial::{OctantId, Octree, OctreeConfig},
    };
}
