//! Debug drawing primitives and system
//!
//! Everything the engine wants drawn goes through [`RenderSink`]: a wireframe
//! unit cube or unit sphere placed by a transform, in a flat color. Mesh
//! generation and GPU upload live on the other side of that trait.
//! [`DebugDrawSystem`] is the in-memory sink: it collects shapes until the
//! renderer drains them.

use std::collections::HashMap;

use crate::foundation::math::{Mat4, Vec3};

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Flat colors used by the visualizers
pub mod colors {
    use crate::foundation::math::Vec3;

    /// White
    pub const C_WHITE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    /// Red
    pub const C_RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    /// Green
    pub const C_GREEN: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    /// Cornflower blue
    pub const C_BLUE_CORNFLOWER: Vec3 = Vec3::new(0.392, 0.584, 0.929);
    /// Yellow
    pub const C_YELLOW: Vec3 = Vec3::new(1.0, 1.0, 0.0);
}

/// Destination for wireframe debug geometry.
///
/// `transform` places a unit shape: a cube of edge 1 or a sphere of radius 1,
/// both centered on the origin.
pub trait RenderSink {
    /// Queue a wireframe cube
    fn add_wire_cube(&mut self, transform: Mat4, color: Vec3);

    /// Queue a wireframe sphere
    fn add_wire_sphere(&mut self, transform: Mat4, color: Vec3);
}

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Unit cube placed by `transform`
    WireCube {
        /// Placement of the unit cube
        transform: Mat4,
        /// Line color
        color: Vec3,
        /// Seconds left before the shape expires
        duration: f32,
    },

    /// Unit sphere placed by `transform`
    WireSphere {
        /// Placement of the unit sphere
        transform: Mat4,
        /// Line color
        color: Vec3,
        /// Seconds left before the shape expires
        duration: f32,
    },
}

impl DebugShape {
    /// Placement of the unit shape
    pub fn transform(&self) -> &Mat4 {
        match self {
            DebugShape::WireCube { transform, .. } | DebugShape::WireSphere { transform, .. } => transform,
        }
    }

    /// Line color
    pub fn color(&self) -> Vec3 {
        match self {
            DebugShape::WireCube { color, .. } | DebugShape::WireSphere { color, .. } => *color,
        }
    }

    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::WireCube { duration, .. } | DebugShape::WireSphere { duration, .. } => *duration,
        }
    }

    /// Is this a cube?
    pub fn is_cube(&self) -> bool {
        matches!(self, DebugShape::WireCube { .. })
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::WireCube { duration, .. } | DebugShape::WireSphere { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Debug drawing system for rendering debug shapes
///
/// Shapes queued through [`RenderSink`] last one frame. Persistent shapes
/// stay until removed by id.
#[derive(Debug)]
pub struct DebugDrawSystem {
    temporary_shapes: Vec<DebugShape>,
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            enabled: true,
        }
    }

    /// Draw a wireframe cube for `duration` seconds
    pub fn draw_cube(&mut self, transform: Mat4, color: Vec3, duration: f32) {
        if !self.enabled {
            return;
        }
        self.temporary_shapes.push(DebugShape::WireCube { transform, color, duration });
    }

    /// Draw a wireframe sphere for `duration` seconds
    pub fn draw_sphere(&mut self, transform: Mat4, color: Vec3, duration: f32) {
        if !self.enabled {
            return;
        }
        self.temporary_shapes.push(DebugShape::WireSphere { transform, color, duration });
    }

    /// Draw a persistent shape that remains until explicitly removed
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }
        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove a persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Update shape lifetimes and remove expired temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }
        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Temporary shapes in the order they were queued
    pub fn shapes(&self) -> &[DebugShape] {
        &self.temporary_shapes
    }

    /// Get all shapes for rendering (both temporary and persistent)
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }
        self.temporary_shapes
            .iter()
            .chain(self.persistent_shapes.values())
            .collect()
    }

    /// Forward every live shape to another sink
    pub fn flush_into(&self, sink: &mut dyn RenderSink) {
        for shape in self.get_shapes() {
            match shape {
                DebugShape::WireCube { transform, color, .. } => sink.add_wire_cube(*transform, *color),
                DebugShape::WireSphere { transform, color, .. } => sink.add_wire_sphere(*transform, *color),
            }
        }
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Clear all shapes (temporary and persistent)
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for DebugDrawSystem {
    fn add_wire_cube(&mut self, transform: Mat4, color: Vec3) {
        self.draw_cube(transform, color, 0.0);
    }

    fn add_wire_sphere(&mut self, transform: Mat4, color: Vec3) {
        self.draw_sphere(transform, color, 0.0);
    }
}
