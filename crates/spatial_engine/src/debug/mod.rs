//! Debug module for visualization and debugging tools
//!
//! Wireframe output for bounding volumes and octants, delivered through the
//! [`RenderSink`] seam.

pub mod collision_debug;
pub mod draw;

pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer, OctreeDisplay, VolumeVisibility};
pub use draw::{colors, DebugDrawSystem, DebugShape, DebugShapeId, RenderSink};
