//! Integration tests for the network animation.
//!
//! These drive the public API the way a host does: build a scene, step
//! frames through an animator and inspect what was generated and drawn.

use nodeweave::graph::generate;
use nodeweave::projection::project;
use nodeweave::rng::seeded;
use nodeweave::{
    Animator, Canvas, DVec2, DVec3, DrawCommand, Entity, FrameControl, ManualPump, NetworkConfig,
    PixelCanvas, RecordingCanvas, Rotation, Scene, SequenceRandom,
};

fn scenario_config() -> NetworkConfig {
    NetworkConfig::default()
        .with_connections(3, 0)
        .with_connection_attempts(10)
        .with_range(4000.0)
        .with_spacing(50.0, 30.0, 50.0)
        .with_sizes(5.0, 1.0, 0.7)
}

fn scene(config: NetworkConfig, seed: u64) -> Scene {
    Scene::new(config, 800, 600, Box::new(seeded(seed))).unwrap()
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_depth_bound_from_size_floor() {
    // ceil(ln(1/5) / ln(0.7)) = 5
    let bound = ((1.0_f64 / 5.0).ln() / 0.7_f64.ln()).ceil() as u32;
    assert_eq!(bound, 5);

    for seed in 0..8 {
        let config = scenario_config();
        let graph = generate(DVec3::ZERO, config.base_size, &config, &mut seeded(seed));
        let stats = graph.stats();
        assert!(stats.max_level <= bound, "seed {} reached level {}", seed, stats.max_level);

        for (_, node) in graph.iter() {
            if node.level == bound {
                assert!(node.terminal);
                assert!(node.size < config.min_size);
            }
        }
    }
}

#[test]
fn test_generated_tree_invariants() {
    let config = scenario_config();
    let graph = generate(DVec3::ZERO, config.base_size, &config, &mut seeded(99));

    let roots = graph.iter().filter(|(_, n)| n.parent.is_none()).count();
    assert_eq!(roots, 1);

    for (id, node) in graph.iter() {
        assert_eq!(node.terminal, node.children.is_empty());
        for &child in &node.children {
            assert_eq!(graph[child].parent, Some(id));
            assert!((graph[child].size - node.size * config.size_multiplier).abs() < 1e-12);
            assert!(graph[child].position.length_squared() < config.square_range());
        }
    }

    let nodes: Vec<_> = graph.iter().map(|(_, n)| n.position).collect();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            assert!(a.distance_squared(*b) >= config.square_allowed());
        }
    }
}

#[test]
fn test_same_seed_same_network() {
    let config = NetworkConfig::default();
    let a = generate(DVec3::ZERO, config.base_size, &config, &mut seeded(17));
    let b = generate(DVec3::ZERO, config.base_size, &config, &mut seeded(17));
    assert_eq!(a.len(), b.len());
    for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
        assert_eq!(x.position, y.position);
    }
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_root_projects_to_vanishing_point() {
    let scene = scene(NetworkConfig::default(), 1);
    let root = scene.graph().root();
    let p = project(root.position, &Rotation::from_angles(0.0, 0.0), scene.viewport());
    assert_eq!(p.position(), scene.viewport().vanish_point);
    assert_eq!(p.position(), DVec2::new(400.0, 300.0));
}

// ============================================================================
// Resize and reset
// ============================================================================

#[test]
fn test_resize_recentres_without_touching_nodes() {
    let mut scene = scene(NetworkConfig::default(), 2);
    let mut canvas = RecordingCanvas::new(800, 600);
    scene.frame(&mut canvas);
    let before: Vec<DVec3> = scene.graph().iter().map(|(_, n)| n.position).collect();

    scene.resize(&mut canvas, 1024, 333);

    assert_eq!(scene.viewport().vanish_point, DVec2::new(512.0, 166.5));
    assert_eq!((canvas.width(), canvas.height()), (1024, 333));
    let after: Vec<DVec3> = scene.graph().iter().map(|(_, n)| n.position).collect();
    assert_eq!(before, after);

    let commands = canvas.take();
    let resize_at = commands
        .iter()
        .position(|c| *c == DrawCommand::Resize { width: 1024, height: 333 })
        .unwrap();
    assert!(matches!(
        commands[resize_at + 2],
        DrawCommand::FillRect { width, height, .. } if width == 1024.0 && height == 333.0
    ));
}

#[test]
fn test_reset_discards_nodes_and_particles() {
    let mut scene = scene(NetworkConfig::default(), 3);
    let mut canvas = RecordingCanvas::new(800, 600);
    for _ in 0..30 {
        scene.frame(&mut canvas);
    }
    assert_eq!(scene.particles().len(), 30);

    scene.reset();

    assert!(scene.particles().is_empty());
    assert_eq!(scene.entities().len(), scene.graph().len());
    assert!(scene.entities().iter().all(|e| matches!(e, Entity::Node(_))));
    let roots = scene.graph().iter().filter(|(_, n)| n.is_root()).count();
    assert_eq!(roots, 1);
}

#[test]
fn test_reset_with_terminal_root_leaves_one_node() {
    let config = NetworkConfig::default().with_sizes(0.5, 1.0, 0.7);
    let mut scene = scene(config, 4);
    let mut canvas = RecordingCanvas::new(800, 600);
    scene.frame(&mut canvas);
    assert_eq!(scene.entities().len(), 2);

    scene.reset();
    assert_eq!(scene.entities(), &[Entity::Node(nodeweave::NodeId::ROOT)]);
}

#[test]
fn test_reset_keeps_rotation_running() {
    let mut scene = scene(NetworkConfig::default(), 5);
    scene.step();
    scene.step();
    scene.reset();
    assert_eq!(scene.tick(), 2);
    scene.step();
    assert_eq!(scene.tick(), 3);
}

// ============================================================================
// Animation loop
// ============================================================================

#[test]
fn test_manual_pump_drives_frames() {
    let mut animator = Animator::new(scene(NetworkConfig::default(), 6));
    let mut pump = ManualPump::default();
    let mut canvas = RecordingCanvas::new(800, 600);

    assert!(animator.start(&mut pump));
    let mut frames = 0;
    while frames < 40 && pump.take() {
        assert_eq!(animator.frame(&mut canvas, &mut pump), FrameControl::Continue);
        frames += 1;
    }

    assert_eq!(frames, 40);
    assert_eq!(animator.scene().tick(), 40);
    assert_eq!(pump.pending(), 1);
}

#[test]
fn test_click_reset_while_running() {
    let mut animator = Animator::new(scene(NetworkConfig::default(), 7));
    let mut canvas = RecordingCanvas::new(800, 600);
    animator.run_frames(&mut canvas, 10);

    let mut pump = ManualPump::default();
    animator.reset(&mut pump);
    assert_eq!(pump.pending(), 0, "loop already running");
    assert!(animator.scene().particles().is_empty());

    assert_eq!(animator.run_frames(&mut canvas, 1), 1);
    assert_eq!(animator.scene().particles().len(), 1);
}

#[test]
fn test_cancelled_loop_ends() {
    let mut animator = Animator::new(scene(NetworkConfig::default(), 8));
    let mut canvas = RecordingCanvas::new(800, 600);
    animator.run_frames(&mut canvas, 3);

    animator.token().cancel();
    assert_eq!(animator.run_frames(&mut canvas, 10), 0);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_rendered_frame_shows_root_on_background() {
    let mut scene = scene(NetworkConfig::default(), 9);
    let mut canvas = PixelCanvas::new(200, 150);
    scene.resize(&mut canvas, 200, 150);
    scene.frame(&mut canvas);

    // root sits at the vanishing point, drawn over the #111 background
    let centre = canvas.pixel(100, 75);
    assert_ne!(&centre[..3], &[0x11, 0x11, 0x11]);
}

#[test]
fn test_deterministic_placement_with_sequence() {
    let config = NetworkConfig::default().with_connections(1, 0).with_sizes(5.0, 4.0, 0.7);
    let mut rng = SequenceRandom::constant(0.5);
    let graph = generate(DVec3::ZERO, 5.0, &config, &mut rng);

    // alpha = pi/2, beta = pi, len = 65: straight down the Z axis
    let child = graph[graph.root().children[0]].position;
    assert!(child.x.abs() < 1e-9);
    assert!(child.y.abs() < 1e-9);
    assert!((child.z + 65.0).abs() < 1e-9);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.json");
    let config = NetworkConfig::default().with_rotation(0.001, 0.0005).with_density(0.5);

    config.save(&path).unwrap();
    let loaded = NetworkConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}
