//! Collision detection pass
//!
//! Split into two phases. The broad phase pairs up entities that share a leaf
//! octant (or every pair when culling is off). The narrow phase runs the
//! sphere pre-test and the separating axis test through
//! [`BoundingVolume::is_colliding_with_variant`](super::BoundingVolume::is_colliding_with_variant),
//! which also keeps each volume's colliding set current.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ecs::EntityManager;
use crate::physics::sat::SatVariant;

/// Collision pair representing two entities that are colliding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// Smaller entity index
    pub entity_a: usize,
    /// Larger entity index
    pub entity_b: usize,
}

impl CollisionPair {
    /// Create a new collision pair (always stores smaller index first for consistency)
    pub fn new(entity_a: usize, entity_b: usize) -> Self {
        if entity_a < entity_b {
            Self { entity_a, entity_b }
        } else {
            Self {
                entity_a: entity_b,
                entity_b: entity_a,
            }
        }
    }

    /// Does this pair involve `entity`?
    pub fn contains(&self, entity: usize) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }
}

/// Collision pass settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Only test entities sharing a leaf octant
    pub use_octree_culling: bool,

    /// Separating axis arithmetic
    pub sat_variant: SatVariant,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            use_octree_culling: true,
            sat_variant: SatVariant::Corrected,
        }
    }
}

/// Per-step collision detection over an [`EntityManager`]
#[derive(Debug, Default)]
pub struct CollisionSystem {
    config: CollisionConfig,

    /// Collision pairs from the current step
    current_pairs: HashSet<CollisionPair>,

    /// Collision pairs from the previous step
    previous_pairs: HashSet<CollisionPair>,

    /// Narrow-phase tests run by the last step
    tests_run: usize,
}

impl CollisionSystem {
    /// Create a new collision system
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active settings
    pub fn config(&self) -> CollisionConfig {
        self.config
    }

    /// Replace the settings; takes effect on the next step
    pub fn set_config(&mut self, config: CollisionConfig) {
        self.config = config;
    }

    /// Perform collision detection (broad-phase + narrow-phase).
    ///
    /// Every colliding set is cleared first, so after the call each volume
    /// lists exactly the volumes it collides with this step. Octant
    /// memberships are read as they stand; rebuild the octree after moving
    /// entities.
    pub fn detect_collisions(&mut self, entities: &mut EntityManager) -> &HashSet<CollisionPair> {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();
        entities.clear_collisions();

        let candidates = self.broad_phase(entities);
        self.tests_run = candidates.len();
        self.narrow_phase(entities, candidates);

        log::trace!(
            "Collision step: {} tests, {} colliding",
            self.tests_run,
            self.current_pairs.len()
        );
        &self.current_pairs
    }

    fn broad_phase(&self, entities: &EntityManager) -> Vec<CollisionPair> {
        let count = entities.len();
        let mut candidates = Vec::new();
        for a in 0..count {
            for b in (a + 1)..count {
                if !self.config.use_octree_culling || entities.shares_octant(a, b) {
                    candidates.push(CollisionPair::new(a, b));
                }
            }
        }
        candidates
    }

    fn narrow_phase(&mut self, entities: &mut EntityManager, candidates: Vec<CollisionPair>) {
        for pair in candidates {
            let Some((volume_a, volume_b)) = entities.bounding_volume_pair_mut(pair.entity_a, pair.entity_b) else {
                continue;
            };
            if volume_a.is_colliding_with_variant(volume_b, self.config.sat_variant) {
                self.current_pairs.insert(pair);
            }
        }
    }

    /// Pairs that started colliding this step
    pub fn get_collision_entered(&self) -> Vec<CollisionPair> {
        let mut entered: Vec<_> = self.current_pairs.difference(&self.previous_pairs).copied().collect();
        entered.sort_unstable();
        entered
    }

    /// Pairs that stopped colliding this step
    pub fn get_collision_exited(&self) -> Vec<CollisionPair> {
        let mut exited: Vec<_> = self.previous_pairs.difference(&self.current_pairs).copied().collect();
        exited.sort_unstable();
        exited
    }

    /// Get all current collision pairs
    pub fn get_current_collisions(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Were `a` and `b` colliding at the last step?
    pub fn is_pair_colliding(&self, a: usize, b: usize) -> bool {
        self.current_pairs.contains(&CollisionPair::new(a, b))
    }

    /// Narrow-phase tests run by the last step
    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    /// Forget all collision history
    pub fn clear(&mut self) {
        self.current_pairs.clear();
        self.previous_pairs.clear();
        self.tests_run = 0;
    }
}
