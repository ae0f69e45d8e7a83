//! Registry seam between the spatial partition and whatever owns the objects
//!
//! The octree never stores bounding volumes itself. It asks the registry for
//! them by index and reports back which leaf octants each index landed in.

use crate::physics::BoundingVolume;
use crate::spatial::OctantId;

/// Index-addressed collection of bounding volumes
pub trait EntityRegistry {
    /// Number of addressable entities (indices `0..entity_count()`)
    fn entity_count(&self) -> usize;

    /// Bounding volume of entity `index`, `None` when out of range
    fn bounding_volume(&self, index: usize) -> Option<&BoundingVolume>;

    /// Record that entity `index` lies in leaf octant `octant`
    fn assign_octant(&mut self, index: usize, octant: OctantId);

    /// Forget every recorded octant membership
    fn clear_octant_assignments(&mut self) {}
}

impl EntityRegistry for Vec<BoundingVolume> {
    fn entity_count(&self) -> usize {
        self.len()
    }

    fn bounding_volume(&self, index: usize) -> Option<&BoundingVolume> {
        self.get(index)
    }

    fn assign_octant(&mut self, _index: usize, _octant: OctantId) {}
}
