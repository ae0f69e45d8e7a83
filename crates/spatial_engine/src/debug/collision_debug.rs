//! Collision-specific debug visualization
//!
//! Turns bounding volumes and octants into wireframes:
//!
//! - bounding sphere: `model * translate(center) * scale(radius)`
//! - oriented box: `model * translate(center) * scale(2 * half_width)`, red
//!   while colliding, white otherwise
//! - re-aligned box: `translate(global center) * scale(arbb_size)`
//! - octants: `translate(center) * scale(size)`

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::debug::draw::colors::{C_BLUE_CORNFLOWER, C_RED, C_WHITE, C_YELLOW};
use crate::debug::draw::{DebugDrawSystem, DebugShape, RenderSink};
use crate::ecs::EntityRegistry;
use crate::foundation::math::{translate_scale, Mat4, Vec3};
use crate::physics::BoundingVolume;
use crate::spatial::{OctantId, Octree};

bitflags! {
    /// Which parts of a bounding volume are drawn
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VolumeVisibility: u8 {
        /// Bounding sphere
        const SPHERE = 1 << 0;
        /// Oriented box
        const OBB = 1 << 1;
        /// World-axis re-aligned box
        const ARBB = 1 << 2;
    }
}

impl Default for VolumeVisibility {
    fn default() -> Self {
        Self::OBB
    }
}

/// Which octants are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OctreeDisplay {
    /// No octants
    #[default]
    Hidden,
    /// Every octant
    All,
    /// The root and every non-empty leaf
    Leaves,
    /// A single octant by id
    Octant(u32),
}

/// Color scheme for collision visualization
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionDebugColors {
    /// Bounding spheres
    pub sphere: Vec3,
    /// Oriented boxes currently colliding
    pub obb_colliding: Vec3,
    /// Oriented boxes not colliding
    pub obb_idle: Vec3,
    /// Re-aligned boxes
    pub arbb: Vec3,
    /// Octant cubes
    pub octree: Vec3,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            sphere: C_BLUE_CORNFLOWER,
            obb_colliding: C_RED,
            obb_idle: C_WHITE,
            arbb: C_YELLOW,
            octree: C_YELLOW,
        }
    }
}

/// Placement of the unit sphere drawn for `volume`
pub fn sphere_wire_transform(volume: &BoundingVolume) -> Mat4 {
    volume.model_matrix() * translate_scale(&volume.center_local(), &Vec3::repeat(volume.radius()))
}

/// Placement of the unit cube drawn for `volume`'s oriented box
pub fn obb_wire_transform(volume: &BoundingVolume) -> Mat4 {
    volume.model_matrix() * translate_scale(&volume.center_local(), &(volume.half_width() * 2.0))
}

/// Placement of the unit cube drawn for `volume`'s re-aligned box
pub fn arbb_wire_transform(volume: &BoundingVolume) -> Mat4 {
    translate_scale(&volume.center_global(), &volume.arbb_size())
}

/// Collision-specific debug visualizer
///
/// Integrates with [`DebugDrawSystem`]; every draw call queues one-frame
/// shapes.
#[derive(Debug)]
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: CollisionDebugColors,

    /// Parts of each volume to draw
    pub visibility: VolumeVisibility,

    /// Octants to draw
    pub octree_display: OctreeDisplay,
}

impl CollisionDebugVisualizer {
    /// Create a new collision debug visualizer
    pub fn new() -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: CollisionDebugColors::default(),
            visibility: VolumeVisibility::default(),
            octree_display: OctreeDisplay::default(),
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Current color scheme
    pub fn colors(&self) -> &CollisionDebugColors {
        &self.colors
    }

    /// Queue the visible parts of one volume
    pub fn draw_volume(&mut self, volume: &BoundingVolume) {
        if self.visibility.contains(VolumeVisibility::SPHERE) {
            self.debug_draw.add_wire_sphere(sphere_wire_transform(volume), self.colors.sphere);
        }
        if self.visibility.contains(VolumeVisibility::OBB) {
            let color = if volume.colliding_count() > 0 {
                self.colors.obb_colliding
            } else {
                self.colors.obb_idle
            };
            self.debug_draw.add_wire_cube(obb_wire_transform(volume), color);
        }
        if self.visibility.contains(VolumeVisibility::ARBB) {
            self.debug_draw.add_wire_cube(arbb_wire_transform(volume), self.colors.arbb);
        }
    }

    /// Queue every volume in `registry`
    pub fn draw_volumes<R: EntityRegistry + ?Sized>(&mut self, registry: &R) {
        for index in 0..registry.entity_count() {
            if let Some(volume) = registry.bounding_volume(index) {
                self.draw_volume(volume);
            }
        }
    }

    /// Queue octants according to [`Self::octree_display`]
    pub fn draw_octree(&mut self, octree: &Octree) {
        let color = self.colors.octree;
        match self.octree_display {
            OctreeDisplay::Hidden => {}
            OctreeDisplay::All => octree.display(&mut self.debug_draw, color),
            OctreeDisplay::Leaves => octree.display_leaves(&mut self.debug_draw, color),
            OctreeDisplay::Octant(id) => {
                if !octree.display_octant(OctantId(id), &mut self.debug_draw, color) {
                    log::debug!("No octant {id} to display");
                }
            }
        }
    }

    /// Pin a marker cube that survives [`Self::update`] until cleared
    pub fn mark_persistent(&mut self, key: impl Into<String>, transform: Mat4, color: Vec3) {
        self.debug_draw.draw_persistent(
            key,
            DebugShape::WireCube {
                transform,
                color,
                duration: f32::INFINITY,
            },
        );
    }

    /// Remove a pinned marker
    pub fn clear_persistent(&mut self, key: &str) {
        self.debug_draw.clear_persistent(key);
    }

    /// Clear all visualization
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }

    /// Update debug system (expire temporary shapes)
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Get all debug shapes for rendering
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        self.debug_draw.get_shapes()
    }

    /// Enable/disable the entire debug system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.debug_draw.enabled = enabled;
    }

    /// Check if debug system is enabled
    pub fn is_enabled(&self) -> bool {
        self.debug_draw.enabled
    }

    /// Get reference to underlying debug draw system
    pub fn debug_draw(&self) -> &DebugDrawSystem {
        &self.debug_draw
    }

    /// Get mutable reference to underlying debug draw system
    pub fn debug_draw_mut(&mut self) -> &mut DebugDrawSystem {
        &mut self.debug_draw
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityManager;
    use crate::foundation::math::{constants::HALF_PI, transform_point, Quat, Transform};
    use crate::spatial::OctreeConfig;
    use approx::assert_relative_eq;

    fn placed_cube(position: Vec3) -> BoundingVolume {
        let mut volume = BoundingVolume::from_points(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)]);
        volume.set_model_matrix(Transform::from_position(position).to_matrix());
        volume
    }

    #[test]
    fn test_visibility_flags_select_shapes() {
        let volume = placed_cube(Vec3::zeros());
        let mut viz = CollisionDebugVisualizer::new();

        viz.draw_volume(&volume);
        assert_eq!(viz.get_shapes().len(), 1);

        viz.clear();
        viz.visibility = VolumeVisibility::all();
        viz.draw_volume(&volume);
        let shapes = viz.get_shapes();
        assert_eq!(shapes.len(), 3);
        assert!(!shapes[0].is_cube());
        assert_eq!(shapes[0].color(), C_BLUE_CORNFLOWER);
        assert_eq!(shapes[2].color(), C_YELLOW);

        viz.update(0.016);
        assert!(viz.get_shapes().is_empty());
    }

    #[test]
    fn test_obb_color_follows_collision_state() {
        let mut a = placed_cube(Vec3::zeros());
        let mut b = placed_cube(Vec3::new(0.5, 0.0, 0.0));
        let mut viz = CollisionDebugVisualizer::new();

        viz.draw_volume(&a);
        assert_eq!(viz.get_shapes()[0].color(), C_WHITE);

        assert!(a.is_colliding(&mut b));
        viz.clear();
        viz.draw_volume(&a);
        assert_eq!(viz.get_shapes()[0].color(), C_RED);
    }

    #[test]
    fn test_wire_transforms_cover_volume() {
        let mut volume = BoundingVolume::from_points(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)]);
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI);
        volume.set_model_matrix(Transform::from_position_rotation(Vec3::new(3.0, 0.0, 0.0), rotation).to_matrix());

        // Unit cube corner (0.5, 0.5, 0.5) lands on the volume's local max corner
        let corner = transform_point(&obb_wire_transform(&volume), &Vec3::repeat(0.5));
        let expected = transform_point(volume.model_matrix(), &volume.max_local());
        assert_relative_eq!(corner, expected, epsilon = 1e-5);

        let arbb_corner = transform_point(&arbb_wire_transform(&volume), &Vec3::repeat(0.5));
        assert_relative_eq!(arbb_corner, volume.max_global(), epsilon = 1e-5);

        let sphere_center = transform_point(&sphere_wire_transform(&volume), &Vec3::zeros());
        assert_relative_eq!(sphere_center, volume.center_global(), epsilon = 1e-5);
    }

    #[test]
    fn test_draw_volumes_and_octree() {
        let mut manager = EntityManager::new();
        let unit = [Vec3::repeat(-0.5), Vec3::repeat(0.5)];
        manager.add_entity("a", &unit);
        let b = manager.add_entity("b", &unit);
        manager.set_model_matrix(b, Transform::from_position(Vec3::repeat(4.0)).to_matrix());
        let octree = Octree::build(OctreeConfig { max_level: 1, ideal_entity_count: 5 }, &mut manager);

        let mut viz = CollisionDebugVisualizer::new();
        viz.draw_volumes(&manager);
        assert_eq!(viz.get_shapes().len(), 2);

        viz.clear();
        viz.octree_display = OctreeDisplay::All;
        viz.draw_octree(&octree);
        assert_eq!(viz.get_shapes().len(), 9);

        viz.clear();
        viz.octree_display = OctreeDisplay::Octant(99);
        viz.draw_octree(&octree);
        assert!(viz.get_shapes().is_empty());
    }

    #[test]
    fn test_persistent_marker() {
        let mut viz = CollisionDebugVisualizer::new();
        viz.mark_persistent("origin", Mat4::identity(), C_WHITE);

        viz.update(10.0);
        assert_eq!(viz.get_shapes().len(), 1);

        viz.clear_persistent("origin");
        assert!(viz.get_shapes().is_empty());

        viz.set_enabled(false);
        viz.mark_persistent("origin", Mat4::identity(), C_WHITE);
        assert!(!viz.is_enabled());
        assert_eq!(viz.debug_draw().shape_count(), 0);
    }
}
