//! Integration tests for a full simulation step
//!
//! Place entities, build the octree, run the collision pass, draw the result.

use crate::config::{Config, SimulationConfig};
use crate::debug::{OctreeDisplay, VolumeVisibility};
use crate::ecs::{EntityManager, EntityRegistry};
use crate::foundation::logging::{self, LevelFilter};
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::physics::{CollisionConfig, CollisionSystem};
use crate::spatial::{Octree, OctreeConfig};

/// Deterministic scatter of `count` rotated boxes inside a 12-unit cube
fn scatter(count: usize, phase: f32) -> EntityManager {
    let mut manager = EntityManager::new();
    let points = [Vec3::new(-0.6, -0.4, -0.5), Vec3::new(0.6, 0.4, 0.5)];

    for i in 0..count {
        let index = manager.add_entity(format!("box{i}"), &points);
        place(&mut manager, index, phase);
    }
    manager
}

fn place(manager: &mut EntityManager, index: usize, phase: f32) {
    let t = index as f32 + phase;
    let position = Vec3::new((t * 1.7).sin(), (t * 2.3).cos(), (t * 0.9).sin()) * 6.0;
    let axis = nalgebra::Unit::new_normalize(Vec3::new(1.0, index as f32, 2.0));
    let rotation = Quat::from_axis_angle(&axis, t * 0.3);
    manager.set_model_matrix(
        index,
        Transform::from_position_rotation(position, rotation).to_matrix(),
    );
}

fn assert_sets_symmetric(manager: &EntityManager, system: &CollisionSystem) {
    let mut memberships = 0;
    for pair in system.get_current_collisions() {
        let a = manager.entity(pair.entity_a).unwrap().volume();
        let b = manager.entity(pair.entity_b).unwrap().volume();
        assert!(a.collides_with(b.id()) && b.collides_with(a.id()));
        memberships += 2;
    }
    let total: usize = manager.iter().map(|e| e.volume().colliding_count()).sum();
    assert_eq!(total, memberships);
}

#[test]
fn test_culling_never_misses_a_collision() {
    logging::init_for_tests(LevelFilter::Debug);
    let mut manager = scatter(40, 0.0);
    let mut octree = Octree::build(OctreeConfig { max_level: 3, ideal_entity_count: 4 }, &mut manager);

    let mut culled = CollisionSystem::new(CollisionConfig::default());
    let mut brute = CollisionSystem::new(CollisionConfig {
        use_octree_culling: false,
        ..CollisionConfig::default()
    });

    for step in 0..4 {
        let phase = step as f32 * 0.25;
        for index in 0..manager.len() {
            place(&mut manager, index, phase);
        }
        octree.rebuild(&mut manager);

        let brute_pairs = brute.detect_collisions(&mut manager).clone();
        let culled_pairs = culled.detect_collisions(&mut manager).clone();

        assert_eq!(culled_pairs, brute_pairs, "step {step}");
        assert!(culled.tests_run() <= brute.tests_run());
        assert_sets_symmetric(&manager, &culled);
    }
}

#[test]
fn test_every_entity_lands_in_a_leaf() {
    let mut manager = scatter(25, 0.5);
    let octree = Octree::build(OctreeConfig::default(), &mut manager);

    for index in 0..manager.entity_count() {
        let octants = octree.octants_containing(index);
        assert!(!octants.is_empty(), "entity {index} not assigned");
        for id in octants {
            assert!(octree.node(id).is_some_and(|node| node.is_leaf()));
        }
    }

    let root = octree.root().bounds();
    for entity in manager.iter() {
        let bounds = entity.volume().global_bounds();
        assert!(root.contains_point(bounds.min) && root.contains_point(bounds.max));
    }
}

#[test]
fn test_point_on_scene_face_is_still_culled_in() {
    let mut brute = CollisionSystem::new(CollisionConfig {
        use_octree_culling: false,
        ..CollisionConfig::default()
    });
    let mut culled = CollisionSystem::new(CollisionConfig::default());

    for k in 0..500 {
        let mut manager = EntityManager::new();
        let crate_box = manager.add_entity("crate", &[Vec3::repeat(-0.5), Vec3::repeat(0.5)]);
        let marker = manager.add_entity("marker", &[Vec3::zeros()]);
        let far = manager.add_entity("far", &[Vec3::repeat(-0.5), Vec3::repeat(0.5)]);

        // The marker sits on the crate's +x face, which is also the scene's
        let distance = 3.0 + 0.0173 * k as f32;
        manager.set_model_matrix(marker, Transform::from_position(Vec3::new(0.5, 0.1, -0.2)).to_matrix());
        manager.set_model_matrix(far, Transform::from_position(Vec3::new(-distance, 0.3, 0.0)).to_matrix());
        Octree::build(OctreeConfig::default(), &mut manager);

        assert!(!manager.entity(marker).unwrap().dimensions().is_empty(), "k = {k}");
        assert!(brute.detect_collisions(&mut manager).len() == 1);
        assert_eq!(culled.detect_collisions(&mut manager), brute.get_current_collisions(), "k = {k}");
        assert!(culled.is_pair_colliding(crate_box, marker));
    }
}

#[test]
fn test_configured_pipeline_draws_everything() {
    let path = std::env::temp_dir().join(format!("spatial_engine_{}_pipeline.ron", std::process::id()));
    std::fs::write(
        &path,
        "(octree: (max_level: 2, ideal_entity_count: 2), debug: (show_sphere: true, show_arbb: true, octree_display: Leaves))",
    )
    .unwrap();
    let config = SimulationConfig::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut manager = scatter(10, 0.0);
    let octree = Octree::build(config.octree, &mut manager);
    let mut system = CollisionSystem::new(config.collision);
    system.detect_collisions(&mut manager);

    let mut visualizer = config.debug.visualizer();
    assert_eq!(visualizer.visibility, VolumeVisibility::all());
    assert_eq!(visualizer.octree_display, OctreeDisplay::Leaves);

    visualizer.draw_volumes(&manager);
    visualizer.draw_octree(&octree);
    assert_eq!(
        visualizer.get_shapes().len(),
        3 * manager.len() + octree.active_octants().len() + 1
    );
}
