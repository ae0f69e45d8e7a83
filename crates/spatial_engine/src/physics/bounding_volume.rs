//! Per-object bounding volume
//!
//! Stores a box in model space (local min/max, center, half-width), the
//! enclosing sphere radius, and the world-space data derived from the
//! current model matrix: the re-aligned world box (ARBB) and the oriented box
//! used by the separating axis test.
//!
//! Shapes are kept in model space and only the eight corners are pushed
//! through the model matrix when it changes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::foundation::geometry::AABB;
use crate::foundation::math::{transform_point, Mat4, Vec3};
use crate::physics::sat::{self, OrientedBox, SatVariant, SeparatingAxis};

static NEXT_VOLUME_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a bounding volume, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(u32);

impl VolumeId {
    fn next() -> Self {
        Self(NEXT_VOLUME_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another.
    ///
    /// Strict: spheres that only touch do not count.
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared < radius_sum * radius_sum
    }
}

/// Bounding volume of one simulated object
#[derive(Debug)]
pub struct BoundingVolume {
    id: VolumeId,

    local_min: Vec3,
    local_max: Vec3,
    center: Vec3,
    half_width: Vec3,
    radius: f32,

    global_min: Vec3,
    global_max: Vec3,
    arbb_size: Vec3,

    model_matrix: Mat4,

    colliding_with: HashSet<VolumeId>,
}

impl BoundingVolume {
    /// Build a volume around a list of object-space points.
    ///
    /// An empty list leaves every quantity at zero.
    pub fn from_points(points: &[Vec3]) -> Self {
        let local = AABB::from_points(points).unwrap_or_default();
        let center = local.center();

        Self {
            id: VolumeId::next(),
            local_min: local.min,
            local_max: local.max,
            center,
            half_width: local.extents(),
            radius: (center - local.min).norm(),
            global_min: local.min,
            global_max: local.max,
            arbb_size: local.size(),
            model_matrix: Mat4::identity(),
            colliding_with: HashSet::new(),
        }
    }

    /// Convenience constructor for a box given by its corners
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self::from_points(&[aabb.min, aabb.max])
    }

    /// Unique identity of this volume
    pub fn id(&self) -> VolumeId {
        self.id
    }

    /// Bounding sphere radius in model space
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Bounding sphere radius after the model matrix's largest axis scale
    pub fn radius_global(&self) -> f32 {
        let scale = (0..3)
            .map(|i| self.model_matrix.fixed_view::<3, 1>(0, i).norm())
            .fold(0.0_f32, f32::max);
        self.radius * scale
    }

    /// Model-space center
    pub fn center_local(&self) -> Vec3 {
        self.center
    }

    /// Model-space minimum corner
    pub fn min_local(&self) -> Vec3 {
        self.local_min
    }

    /// Model-space maximum corner
    pub fn max_local(&self) -> Vec3 {
        self.local_max
    }

    /// World-space center (model matrix applied to the local center)
    pub fn center_global(&self) -> Vec3 {
        transform_point(&self.model_matrix, &self.center)
    }

    /// World-space minimum corner of the re-aligned box
    pub fn min_global(&self) -> Vec3 {
        self.global_min
    }

    /// World-space maximum corner of the re-aligned box
    pub fn max_global(&self) -> Vec3 {
        self.global_max
    }

    /// World-space re-aligned box
    pub fn global_bounds(&self) -> AABB {
        AABB::new(self.global_min, self.global_max)
    }

    /// Half of the local extent along each axis
    pub fn half_width(&self) -> Vec3 {
        self.half_width
    }

    /// Edge lengths of the world-space re-aligned box
    pub fn arbb_size(&self) -> Vec3 {
        self.arbb_size
    }

    /// Current placement
    pub fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    /// Place the volume in the world.
    ///
    /// Re-derives the global box from the eight transformed corners. Setting
    /// the matrix already in use does nothing.
    pub fn set_model_matrix(&mut self, model_matrix: Mat4) {
        if model_matrix == self.model_matrix {
            return;
        }
        self.model_matrix = model_matrix;

        let local = AABB::new(self.local_min, self.local_max);
        let corners = local.corners().map(|corner| transform_point(&self.model_matrix, &corner));

        // corners is never empty, the fallback only satisfies the type
        let global = AABB::from_points(&corners).unwrap_or_default();
        self.global_min = global.min;
        self.global_max = global.max;
        self.arbb_size = global.size();
    }

    /// World-space bounding sphere
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center_global(), self.radius_global())
    }

    /// World-space oriented box
    pub fn oriented_box(&self) -> OrientedBox {
        OrientedBox::from_model_matrix(&self.model_matrix, &self.center, &self.half_width)
    }

    /// Broad test: do the bounding spheres overlap?
    pub fn spheres_overlap(&self, other: &BoundingVolume) -> bool {
        self.bounding_sphere().intersects(&other.bounding_sphere())
    }

    /// Narrow test: the axis separating the two oriented boxes, if any
    pub fn separating_axis(&self, other: &BoundingVolume, variant: SatVariant) -> Option<SeparatingAxis> {
        sat::separating_axis_with(&self.oriented_box(), &other.oriented_box(), variant)
    }

    /// Test two volumes and record the outcome in both colliding sets
    pub fn is_colliding(&mut self, other: &mut BoundingVolume) -> bool {
        self.is_colliding_with_variant(other, SatVariant::Corrected)
    }

    /// [`Self::is_colliding`] with an explicit separating axis arithmetic
    pub fn is_colliding_with_variant(&mut self, other: &mut BoundingVolume, variant: SatVariant) -> bool {
        let colliding = self.spheres_overlap(other) && self.separating_axis(other, variant).is_none();

        if colliding {
            self.add_collision_with(other.id);
            other.add_collision_with(self.id);
        } else {
            self.remove_collision_with(other.id);
            other.remove_collision_with(self.id);
        }

        colliding
    }

    /// Record a collision with `other` (idempotent)
    pub fn add_collision_with(&mut self, other: VolumeId) {
        self.colliding_with.insert(other);
    }

    /// Forget a collision with `other`
    pub fn remove_collision_with(&mut self, other: VolumeId) {
        self.colliding_with.remove(&other);
    }

    /// Forget every recorded collision
    pub fn clear_colliding(&mut self) {
        self.colliding_with.clear();
    }

    /// Was a collision with `other` recorded by the last test?
    pub fn collides_with(&self, other: VolumeId) -> bool {
        self.colliding_with.contains(&other)
    }

    /// Number of volumes this one currently collides with
    pub fn colliding_count(&self) -> usize {
        self.colliding_with.len()
    }

    /// Currently colliding volumes
    pub fn colliding_set(&self) -> &HashSet<VolumeId> {
        &self.colliding_with
    }
}

impl Clone for BoundingVolume {
    /// Copies bounds and placement under a fresh identity.
    ///
    /// The copy starts with an empty colliding set: no other volume lists the
    /// new id yet.
    fn clone(&self) -> Self {
        Self {
            id: VolumeId::next(),
            colliding_with: HashSet::new(),
            ..*self
        }
    }
}
