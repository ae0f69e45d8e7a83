//! Octree spatial partitioning structure
//!
//! Divides the cube enclosing every registered entity into eight octants,
//! recursively, wherever more entities overlap an octant than the configured
//! ideal count. Only leaves hold entity indices; the tree keeps a compact list
//! of the non-empty leaves so broad-phase queries skip empty space.
//!
//! The tree is rebuilt wholesale rather than updated incrementally: moving an
//! entity invalidates its memberships until [`Octree::rebuild`] runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::debug::RenderSink;
use crate::ecs::EntityRegistry;
use crate::foundation::geometry::AABB;
use crate::foundation::math::{translate_scale, Vec3};

/// Upper bound on subdivision depth
pub const MAX_LEVEL_LIMIT: u32 = 10;

/// Identifier of an octant, unique within one build of a tree.
///
/// Ids are handed out in construction order: the root is 0, each
/// subdivision numbers all eight children before descending into any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OctantId(pub u32);

impl OctantId {
    /// The root octant
    pub const ROOT: Self = Self(0);

    /// Raw numeric value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OctantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "octant#{}", self.0)
    }
}

/// Configuration for octree behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Maximum subdivision depth (root is level 0)
    pub max_level: u32,

    /// Entities an octant may overlap before it is subdivided
    pub ideal_entity_count: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_level: 3,
            ideal_entity_count: 5,
        }
    }
}

impl OctreeConfig {
    /// Clamp `max_level` into `1..=MAX_LEVEL_LIMIT` and
    /// `ideal_entity_count` to at least 1
    pub fn normalized(self) -> Self {
        let max_level = self.max_level.clamp(1, MAX_LEVEL_LIMIT);
        if max_level != self.max_level {
            log::warn!(
                "Octree max_level {} out of range, clamped to {}",
                self.max_level,
                max_level
            );
        }

        let ideal_entity_count = self.ideal_entity_count.max(1);
        if ideal_entity_count != self.ideal_entity_count {
            log::warn!("Octree ideal_entity_count must be at least 1, using 1");
        }

        Self {
            max_level,
            ideal_entity_count,
        }
    }
}

/// Per-build state threaded through subdivision
struct BuildContext<'r, R: EntityRegistry + ?Sized> {
    registry: &'r R,
    config: OctreeConfig,
    /// Child-slot path from the root, indexed by id
    routes: Vec<Vec<u8>>,
}

impl<'r, R: EntityRegistry + ?Sized> BuildContext<'r, R> {
    fn new(registry: &'r R, config: OctreeConfig) -> Self {
        Self {
            registry,
            config,
            routes: vec![Vec::new()],
        }
    }

    fn allocate(&mut self, parent_route: &[u8], slot: u8) -> OctantId {
        let mut route = parent_route.to_vec();
        route.push(slot);
        self.routes.push(route);
        // Route table length is bounded by 8^MAX_LEVEL_LIMIT nodes
        OctantId((self.routes.len() - 1) as u32)
    }
}

/// Single node in the octree hierarchy
#[derive(Debug)]
pub struct OctantNode {
    id: OctantId,
    level: u32,
    bounds: AABB,
    center: Vec3,
    size: f32,
    children: Option<Box<[OctantNode; 8]>>,
    entities: Vec<usize>,
    parent: Option<OctantId>,
    root: OctantId,
}

impl OctantNode {
    fn new(id: OctantId, level: u32, bounds: AABB, size: f32, parent: Option<OctantId>) -> Self {
        Self {
            id,
            level,
            bounds,
            center: bounds.center(),
            size,
            children: None,
            entities: Vec::new(),
            parent,
            root: OctantId::ROOT,
        }
    }

    /// Identifier of this octant
    pub fn id(&self) -> OctantId {
        self.id
    }

    /// Depth in the tree (0 = root)
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Center of the cube
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Full edge length of the cube
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.bounds.min
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.bounds.max
    }

    /// Cube as a box.
    ///
    /// Children split their parent at its center, so siblings share faces
    /// exactly and together cover the parent with no gap.
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Parent octant, `None` for the root
    pub fn parent(&self) -> Option<OctantId> {
        self.parent
    }

    /// Root of the tree this octant belongs to
    pub fn root(&self) -> OctantId {
        self.root
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The eight children, if subdivided
    pub fn children(&self) -> Option<&[OctantNode; 8]> {
        self.children.as_deref()
    }

    /// Child in `slot` (bit 0 = +x, bit 1 = +y, bit 2 = +z)
    pub fn child(&self, slot: usize) -> Option<&OctantNode> {
        self.children.as_ref().and_then(|children| children.get(slot))
    }

    /// Entity indices assigned to this octant (leaves only)
    pub fn entities(&self) -> &[usize] {
        &self.entities
    }

    /// Does entity `index`'s world box overlap this cube?
    ///
    /// Touching counts as overlap. Unknown indices never overlap.
    pub fn overlaps_entity<R: EntityRegistry + ?Sized>(&self, registry: &R, index: usize) -> bool {
        if index >= registry.entity_count() {
            return false;
        }
        registry
            .bounding_volume(index)
            .is_some_and(|volume| self.bounds().intersects(&volume.global_bounds()))
    }

    /// Do more than `threshold` entities overlap this cube?
    fn exceeds_entity_count<R: EntityRegistry + ?Sized>(&self, registry: &R, threshold: usize) -> bool {
        let mut count = 0;
        for index in 0..registry.entity_count() {
            if self.overlaps_entity(registry, index) {
                count += 1;
                if count > threshold {
                    return true;
                }
            }
        }
        false
    }

    /// Split into eight half-size children, recursing into any child that is
    /// still too crowded. No-op when already subdivided or at the depth limit.
    fn subdivide<R: EntityRegistry + ?Sized>(&mut self, ctx: &mut BuildContext<'_, R>, route: &mut Vec<u8>) {
        if self.level >= ctx.config.max_level || self.children.is_some() {
            return;
        }

        let child_size = self.size * 0.5;
        let (lo, mid, hi) = (self.bounds.min, self.center, self.bounds.max);

        // Octant layout: bit 0 -> x, bit 1 -> y, bit 2 -> z; set bit = positive side
        let mut children: Box<[OctantNode; 8]> = Box::new(std::array::from_fn(|slot| {
            let mut min = lo;
            let mut max = mid;
            for axis in 0..3 {
                if slot & (1 << axis) != 0 {
                    min[axis] = mid[axis];
                    max[axis] = hi[axis];
                }
            }
            let id = ctx.allocate(route.as_slice(), slot as u8);
            OctantNode::new(id, self.level + 1, AABB::new(min, max), child_size, Some(self.id))
        }));

        for (slot, child) in children.iter_mut().enumerate() {
            if child.level < ctx.config.max_level
                && child.exceeds_entity_count(ctx.registry, ctx.config.ideal_entity_count)
            {
                route.push(slot as u8);
                child.subdivide(ctx, route);
                route.pop();
            }
        }

        log::trace!("Subdivided {} at level {}", self.id, self.level);
        self.children = Some(children);
    }

    /// Give every leaf the indices of the entities it overlaps and report
    /// each membership to the registry
    fn assign_entities<R: EntityRegistry + ?Sized>(&mut self, registry: &mut R) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.assign_entities(registry);
            }
            return;
        }

        for index in 0..registry.entity_count() {
            if self.overlaps_entity(registry, index) {
                self.entities.push(index);
                registry.assign_octant(index, self.id);
            }
        }
    }

    /// Post-order: children first, then self if it holds entities
    fn collect_active(&self, active: &mut Vec<OctantId>) {
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_active(active);
            }
        }
        if !self.entities.is_empty() {
            active.push(self.id);
        }
    }

    /// Drop every descendant, deepest first
    fn kill_branches(&mut self) {
        if let Some(mut children) = self.children.take() {
            for child in children.iter_mut() {
                child.kill_branches();
            }
        }
    }

    fn clear_entity_lists(&mut self) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.clear_entity_lists();
            }
        }
        self.entities.clear();
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a OctantNode>) {
        match self.children.as_ref() {
            Some(children) => children.iter().for_each(|child| child.collect_leaves(leaves)),
            None => leaves.push(self),
        }
    }

    fn max_level(&self) -> u32 {
        self.children
            .as_ref()
            .map_or(self.level, |children| children.iter().map(Self::max_level).max().unwrap_or(self.level))
    }

    fn draw(&self, sink: &mut dyn RenderSink, color: Vec3) {
        sink.add_wire_cube(translate_scale(&self.center, &Vec3::repeat(self.size)), color);
    }

    fn draw_recursive(&self, sink: &mut dyn RenderSink, color: Vec3) {
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.draw_recursive(sink, color);
            }
        }
        self.draw(sink, color);
    }
}

/// Octree spatial partitioning structure
#[derive(Debug)]
pub struct Octree {
    root: OctantNode,
    config: OctreeConfig,
    routes: Vec<Vec<u8>>,
    active: Vec<OctantId>,
}

impl Octree {
    /// Build a tree over every entity in `registry`.
    ///
    /// The registry's previous octant assignments are cleared and replaced
    /// with the new leaf memberships.
    pub fn build<R: EntityRegistry + ?Sized>(config: OctreeConfig, registry: &mut R) -> Self {
        let mut tree = Self {
            root: OctantNode::new(OctantId::ROOT, 0, AABB::default(), 0.0, None),
            config: config.normalized(),
            routes: Vec::new(),
            active: Vec::new(),
        };
        tree.rebuild(registry);
        tree
    }

    /// Tear the tree down and construct it again from the registry's current
    /// bounding volumes
    pub fn rebuild<R: EntityRegistry + ?Sized>(&mut self, registry: &mut R) {
        self.root.kill_branches();
        self.root.clear_entity_lists();
        self.active.clear();
        registry.clear_octant_assignments();

        let (bounds, size) = Self::enclosing_cube(registry);
        self.root = OctantNode::new(OctantId::ROOT, 0, bounds, size, None);

        let mut ctx = BuildContext::new(&*registry, self.config);
        self.root.subdivide(&mut ctx, &mut Vec::new());
        self.routes = ctx.routes;

        self.root.assign_entities(registry);
        self.root.collect_active(&mut self.active);

        log::debug!(
            "Octree rebuilt: {} octants, {} active, depth {}, {} entities",
            self.octant_count(),
            self.active.len(),
            self.depth(),
            registry.entity_count()
        );
    }

    /// Rebuild with new limits
    pub fn reconfigure<R: EntityRegistry + ?Sized>(&mut self, config: OctreeConfig, registry: &mut R) {
        self.config = config.normalized();
        self.rebuild(registry);
    }

    /// Cube around the union of every entity's world box, centered on that
    /// union with the longest edge of it, plus that edge length.
    ///
    /// The cube is widened to the union's own corners wherever rounding left
    /// it short, so a face flush with the union still encloses it.
    fn enclosing_cube<R: EntityRegistry + ?Sized>(registry: &R) -> (AABB, f32) {
        let corners: Vec<Vec3> = (0..registry.entity_count())
            .filter_map(|index| registry.bounding_volume(index))
            .flat_map(|volume| [volume.min_global(), volume.max_global()])
            .collect();

        let aggregate = AABB::from_points(&corners).unwrap_or_default();
        let half = aggregate.extents().max();
        let mut cube = AABB::from_center_extents(aggregate.center(), Vec3::repeat(half));
        cube.grow(&aggregate.min);
        cube.grow(&aggregate.max);
        (cube, half * 2.0)
    }

    /// Configuration the tree was built with (after clamping)
    pub fn config(&self) -> OctreeConfig {
        self.config
    }

    /// The root octant
    pub fn root(&self) -> &OctantNode {
        &self.root
    }

    /// Octant with the given id
    pub fn node(&self, id: OctantId) -> Option<&OctantNode> {
        let route = self.routes.get(id.0 as usize)?;
        route
            .iter()
            .try_fold(&self.root, |node, &slot| node.child(slot as usize))
    }

    /// Parent of octant `id`
    pub fn parent_of(&self, id: OctantId) -> Option<OctantId> {
        self.node(id).and_then(OctantNode::parent)
    }

    /// Total octants, root included
    pub fn octant_count(&self) -> usize {
        self.routes.len()
    }

    /// Deepest level reached
    pub fn depth(&self) -> u32 {
        self.root.max_level()
    }

    /// Every leaf, empty or not
    pub fn leaves(&self) -> Vec<&OctantNode> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }

    /// Leaves holding at least one entity, in post-order
    pub fn active_octants(&self) -> &[OctantId] {
        &self.active
    }

    /// Leaves entity `index` was assigned to
    pub fn octants_containing(&self, index: usize) -> Vec<OctantId> {
        self.active
            .iter()
            .copied()
            .filter(|&id| self.node(id).is_some_and(|node| node.entities.contains(&index)))
            .collect()
    }

    /// Entities assigned to any non-empty leaf whose cube overlaps `aabb`.
    ///
    /// Broad phase only: the entities themselves may not touch `aabb`.
    pub fn query_aabb(&self, aabb: &AABB) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .active
            .iter()
            .filter_map(|&id| self.node(id))
            .filter(|node| node.bounds().intersects(aabb))
            .flat_map(|node| node.entities.iter().copied())
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Every unordered pair of entities sharing at least one leaf, `a < b`
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for node in self.active.iter().filter_map(|&id| self.node(id)) {
            for (i, &a) in node.entities.iter().enumerate() {
                for &b in &node.entities[i + 1..] {
                    pairs.push((a.min(b), a.max(b)));
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Draw every octant
    pub fn display(&self, sink: &mut dyn RenderSink, color: Vec3) {
        self.root.draw_recursive(sink, color);
    }

    /// Draw the single octant `id`; returns `false` if it does not exist
    pub fn display_octant(&self, id: OctantId, sink: &mut dyn RenderSink, color: Vec3) -> bool {
        match self.node(id) {
            Some(node) => {
                node.draw(sink, color);
                true
            }
            None => false,
        }
    }

    /// Draw the root cube and every non-empty leaf
    pub fn display_leaves(&self, sink: &mut dyn RenderSink, color: Vec3) {
        for node in self.active.iter().filter_map(|&id| self.node(id)) {
            node.draw(sink, color);
        }
        self.root.draw(sink, color);
    }
}
