//! Entity implementation

use crate::foundation::math::{Mat4, Vec3};
use crate::physics::BoundingVolume;
use crate::spatial::OctantId;

/// A simulated object: a named bounding volume plus the leaf octants
/// ("dimensions") it currently occupies
#[derive(Debug, Clone)]
pub struct Entity {
    unique_id: String,
    volume: BoundingVolume,
    dimensions: Vec<OctantId>,
}

impl Entity {
    /// Create a new entity around a point cloud
    pub(super) fn new(unique_id: String, points: &[Vec3]) -> Self {
        Self {
            unique_id,
            volume: BoundingVolume::from_points(points),
            dimensions: Vec::new(),
        }
    }

    /// Get the entity's unique identifier
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Bounding volume of this entity
    pub fn volume(&self) -> &BoundingVolume {
        &self.volume
    }

    /// Mutable bounding volume of this entity
    pub fn volume_mut(&mut self) -> &mut BoundingVolume {
        &mut self.volume
    }

    /// Place the entity in the world
    pub fn set_model_matrix(&mut self, model_matrix: Mat4) {
        self.volume.set_model_matrix(model_matrix);
    }

    /// Leaf octants this entity lies in
    pub fn dimensions(&self) -> &[OctantId] {
        &self.dimensions
    }

    /// Record membership in `octant`, ignoring duplicates
    pub fn add_dimension(&mut self, octant: OctantId) {
        if !self.dimensions.contains(&octant) {
            self.dimensions.push(octant);
        }
    }

    /// Drop membership in `octant`
    pub fn remove_dimension(&mut self, octant: OctantId) {
        self.dimensions.retain(|&d| d != octant);
    }

    /// Drop every membership
    pub fn clear_dimensions(&mut self) {
        self.dimensions.clear();
    }

    /// Is this entity a member of `octant`?
    pub fn is_in_dimension(&self, octant: OctantId) -> bool {
        self.dimensions.contains(&octant)
    }

    /// Do the two entities have an octant in common?
    ///
    /// Entities with no membership at all (no tree built yet) are treated as
    /// sharing space, so callers fall back to testing them.
    pub fn shares_dimension(&self, other: &Entity) -> bool {
        if self.dimensions.is_empty() && other.dimensions.is_empty() {
            return true;
        }
        self.dimensions.iter().any(|d| other.dimensions.contains(d))
    }
}
