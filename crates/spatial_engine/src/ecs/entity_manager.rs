//! Entity manager
//!
//! Owns every [`Entity`], addresses them by dense index (the form the octree
//! consumes) and by unique string id.
//!
//! Removing an entity shifts the indices of every entity after it, so any
//! octree built over the manager must be rebuilt afterwards.

use std::collections::HashMap;

use super::{Entity, EntityRegistry};
use crate::foundation::math::{Mat4, Vec3};
use crate::physics::BoundingVolume;
use crate::spatial::OctantId;

/// Indexed store of entities
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: Vec<Entity>,
    index_by_id: HashMap<String, usize>,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity wrapped around `points` and return its index.
    ///
    /// A taken `unique_id` gets a `_N` suffix; read the final id back through
    /// [`Entity::unique_id`].
    pub fn add_entity(&mut self, unique_id: impl Into<String>, points: &[Vec3]) -> usize {
        let unique_id = self.make_unique(unique_id.into());
        let index = self.entities.len();

        self.index_by_id.insert(unique_id.clone(), index);
        self.entities.push(Entity::new(unique_id, points));

        log::trace!("Added entity {} at index {}", self.entities[index].unique_id(), index);
        index
    }

    fn make_unique(&self, base: String) -> String {
        if !self.index_by_id.contains_key(&base) {
            return base;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.index_by_id.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Remove the entity at `index`, shifting later indices down by one.
    ///
    /// Every remaining volume forgets any collision with the removed one.
    pub fn remove_entity(&mut self, index: usize) -> Option<Entity> {
        if index >= self.entities.len() {
            return None;
        }
        let removed = self.entities.remove(index);
        self.index_by_id.remove(removed.unique_id());
        let removed_volume = removed.volume().id();
        for entity in &mut self.entities {
            entity.volume_mut().remove_collision_with(removed_volume);
        }
        for slot in self.index_by_id.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Remove the entity called `unique_id`
    pub fn remove_entity_by_id(&mut self, unique_id: &str) -> Option<Entity> {
        let index = self.index_of(unique_id)?;
        self.remove_entity(index)
    }

    /// Index of the entity called `unique_id`
    pub fn index_of(&self, unique_id: &str) -> Option<usize> {
        self.index_by_id.get(unique_id).copied()
    }

    /// Entity at `index`
    pub fn entity(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Mutable entity at `index`
    pub fn entity_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    /// Entity called `unique_id`
    pub fn entity_by_id(&self, unique_id: &str) -> Option<&Entity> {
        self.index_of(unique_id).and_then(|index| self.entity(index))
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Are there no entities?
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over entities in index order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Place entity `index`; returns `false` for an unknown index
    pub fn set_model_matrix(&mut self, index: usize, model_matrix: Mat4) -> bool {
        match self.entities.get_mut(index) {
            Some(entity) => {
                entity.set_model_matrix(model_matrix);
                true
            }
            None => false,
        }
    }

    /// Place the entity called `unique_id`; returns `false` when unknown
    pub fn set_model_matrix_by_id(&mut self, unique_id: &str, model_matrix: Mat4) -> bool {
        match self.index_of(unique_id) {
            Some(index) => self.set_model_matrix(index, model_matrix),
            None => false,
        }
    }

    /// Do entities `a` and `b` share a leaf octant?
    ///
    /// Out-of-range indices never share anything.
    pub fn shares_octant(&self, a: usize, b: usize) -> bool {
        match (self.entities.get(a), self.entities.get(b)) {
            (Some(ea), Some(eb)) => ea.shares_dimension(eb),
            _ => false,
        }
    }

    /// Mutable access to two distinct entities' volumes at once
    pub fn bounding_volume_pair_mut(
        &mut self,
        a: usize,
        b: usize,
    ) -> Option<(&mut BoundingVolume, &mut BoundingVolume)> {
        if a == b || a >= self.entities.len() || b >= self.entities.len() {
            return None;
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.entities.split_at_mut(high);
        let (low_volume, high_volume) = (head[low].volume_mut(), tail[0].volume_mut());

        if a < b {
            Some((low_volume, high_volume))
        } else {
            Some((high_volume, low_volume))
        }
    }

    /// Clear every entity's colliding set
    pub fn clear_collisions(&mut self) {
        for entity in &mut self.entities {
            entity.volume_mut().clear_colliding();
        }
    }
}

impl EntityRegistry for EntityManager {
    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn bounding_volume(&self, index: usize) -> Option<&BoundingVolume> {
        self.entities.get(index).map(Entity::volume)
    }

    fn assign_octant(&mut self, index: usize, octant: OctantId) {
        if let Some(entity) = self.entities.get_mut(index) {
            entity.add_dimension(octant);
        }
    }

    fn clear_octant_assignments(&mut self) {
        for entity in &mut self.entities {
            entity.clear_dimensions();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;

    fn cube() -> Vec<Vec3> {
        vec![Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)]
    }

    #[test]
    fn test_add_and_lookup() {
        let mut manager = EntityManager::new();
        let a = manager.add_entity("cube", &cube());
        let b = manager.add_entity("sphere", &cube());

        assert_eq!((a, b), (0, 1));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.index_of("sphere"), Some(1));
        assert!(manager.entity_by_id("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_get_suffix() {
        let mut manager = EntityManager::new();
        manager.add_entity("cube", &cube());
        let second = manager.add_entity("cube", &cube());
        let third = manager.add_entity("cube", &cube());

        assert_eq!(manager.entity(second).map(Entity::unique_id), Some("cube_1"));
        assert_eq!(manager.entity(third).map(Entity::unique_id), Some("cube_2"));
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut manager = EntityManager::new();
        manager.add_entity("a", &cube());
        manager.add_entity("b", &cube());
        manager.add_entity("c", &cube());

        let removed = manager.remove_entity_by_id("a");
        assert_eq!(removed.as_ref().map(Entity::unique_id), Some("a"));
        assert_eq!(manager.index_of("b"), Some(0));
        assert_eq!(manager.index_of("c"), Some(1));
        assert!(manager.remove_entity(5).is_none());
    }

    #[test]
    fn test_set_model_matrix_by_id() {
        let mut manager = EntityManager::new();
        manager.add_entity("a", &cube());

        let moved = Transform::from_position(Vec3::new(3.0, 0.0, 0.0)).to_matrix();
        assert!(manager.set_model_matrix_by_id("a", moved));
        assert!(!manager.set_model_matrix_by_id("b", moved));
        assert!(!manager.set_model_matrix(4, moved));

        let volume = manager.bounding_volume(0).unwrap();
        assert_eq!(volume.min_global(), Vec3::new(2.5, -0.5, -0.5));
    }

    #[test]
    fn test_octant_membership() {
        let mut manager = EntityManager::new();
        manager.add_entity("a", &cube());
        manager.add_entity("b", &cube());
        manager.add_entity("c", &cube());

        // No memberships yet: everything may overlap
        assert!(manager.shares_octant(0, 1));

        manager.assign_octant(0, OctantId(3));
        manager.assign_octant(0, OctantId(3));
        manager.assign_octant(1, OctantId(3));
        manager.assign_octant(2, OctantId(4));
        manager.assign_octant(9, OctantId(4));

        assert_eq!(manager.entity(0).unwrap().dimensions(), &[OctantId(3)]);
        assert!(manager.shares_octant(0, 1));
        assert!(!manager.shares_octant(0, 2));
        assert!(!manager.shares_octant(0, 9));

        manager.clear_octant_assignments();
        assert!(manager.iter().all(|e| e.dimensions().is_empty()));
    }

    #[test]
    fn test_bounding_volume_pair_mut() {
        let mut manager = EntityManager::new();
        manager.add_entity("a", &cube());
        manager.add_entity("b", &cube());

        assert!(manager.bounding_volume_pair_mut(0, 0).is_none());
        assert!(manager.bounding_volume_pair_mut(0, 2).is_none());

        let id_a = manager.bounding_volume(0).unwrap().id();
        let (first, second) = manager.bounding_volume_pair_mut(1, 0).unwrap();
        assert_eq!(second.id(), id_a);
        assert!(first.is_colliding(second));

        manager.clear_collisions();
        assert!(manager.iter().all(|e| e.volume().colliding_count() == 0));
    }

    #[test]
    fn test_remove_drops_stale_collisions() {
        let mut manager = EntityManager::new();
        manager.add_entity("a", &cube());
        manager.add_entity("b", &cube());
        manager.add_entity("c", &cube());

        let (a, b) = manager.bounding_volume_pair_mut(0, 1).unwrap();
        assert!(a.is_colliding(b));
        let (a, c) = manager.bounding_volume_pair_mut(0, 2).unwrap();
        assert!(a.is_colliding(c));
        let (b, c) = manager.bounding_volume_pair_mut(1, 2).unwrap();
        assert!(b.is_colliding(c));

        manager.remove_entity_by_id("a");

        let b = manager.entity_by_id("b").unwrap().volume();
        let c = manager.entity_by_id("c").unwrap().volume();
        assert_eq!(b.colliding_count(), 1);
        assert_eq!(c.colliding_count(), 1);
        assert!(b.collides_with(c.id()) && c.collides_with(b.id()));
    }
}
