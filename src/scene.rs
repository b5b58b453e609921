//! The simulation context: one network, its particles and the camera.
//!
//! [`Scene::frame`] runs one animation frame against a [`Canvas`]:
//!
//! 1. repaint the background (`source-over`),
//! 2. advance the tick and recompute the rotation,
//! 3. spawn one particle if the population is below its cap,
//! 4. project every node and particle, then stroke all edges as one
//!    additive (`lighter`) wireframe batch,
//! 5. sort nodes and particles far-to-near,
//! 6. draw nodes as circles and particles as short trails.

use glam::{DVec2, DVec3};

use crate::canvas::{Canvas, CompositeMode, Path};
use crate::color::{depth_fog, Rgba};
use crate::config::NetworkConfig;
use crate::error::ConfigError;
use crate::graph::{generate, NodeGraph, NodeId};
use crate::particle::Particle;
use crate::projection::{project, Rotation, Viewport};
use crate::rng::RandomSource;

/// Node lightness in percent.
const NODE_LIGHTNESS: f32 = 30.0;
/// Particle lightness in percent.
const DATA_LIGHTNESS: f32 = 40.0;
/// Smallest node radius drawn, in pixels.
const MIN_NODE_RADIUS: f64 = 0.1;

/// Anything that is depth-sorted and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Node(NodeId),
    /// Index into [`Scene::particles`].
    Particle(usize),
}

pub struct Scene {
    config: NetworkConfig,
    graph: NodeGraph,
    particles: Vec<Particle>,
    entities: Vec<Entity>,
    tick: u64,
    rotation: Rotation,
    viewport: Viewport,
    wireframe: Path,
    rng: Box<dyn RandomSource>,
}

impl Scene {
    /// Build a scene for a `width` x `height` canvas and generate its first
    /// network. Fails if `config` does not validate.
    pub fn new(
        config: NetworkConfig,
        width: u32,
        height: u32,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut viewport = Viewport::new(width, height, config.focal_length, config.depth);
        if let Some([x, y]) = config.vanish_point {
            viewport.vanish_point = DVec2::new(x, y);
        }

        let mut scene = Self {
            graph: NodeGraph::with_root(DVec3::ZERO, config.base_size),
            config,
            particles: Vec::new(),
            entities: Vec::new(),
            tick: 0,
            rotation: Rotation::IDENTITY,
            viewport,
            wireframe: Path::new(),
            rng,
        };
        scene.reset();
        Ok(scene)
    }

    /// Discard the network and its particles and grow a new one from a
    /// single root. Rotation continues from the current tick.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.entities.clear();
        self.wireframe.clear();

        self.graph = generate(DVec3::ZERO, self.config.base_size, &self.config, self.rng.as_mut());
        self.entities.extend(self.graph.ids().map(Entity::Node));
        log::debug!("Scene reset: {} nodes", self.graph.len());
    }

    /// Resize the canvas, recentre the vanishing point and repaint. The
    /// network is kept as is.
    pub fn resize<C: Canvas + ?Sized>(&mut self, canvas: &mut C, width: u32, height: u32) {
        canvas.resize(width, height);
        self.viewport.resize(width, height);
        canvas.set_composite(CompositeMode::SourceOver);
        canvas.fill(self.config.repaint_color);
        log::info!("Viewport resized to {}x{}", width, height);
    }

    /// Fill shown before the first network exists.
    pub fn paint_loading<C: Canvas + ?Sized>(canvas: &mut C, config: &NetworkConfig) {
        canvas.set_composite(CompositeMode::SourceOver);
        canvas.fill(config.loading_color);
    }

    /// Run one full frame.
    pub fn frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        canvas.set_composite(CompositeMode::SourceOver);
        canvas.fill(self.config.repaint_color);

        self.step();

        canvas.set_composite(CompositeMode::Lighter);
        canvas.stroke_path(&self.wireframe, self.config.wireframe_width, self.config.wireframe_color);
        canvas.set_composite(CompositeMode::SourceOver);

        self.sort_entities();
        self.draw_entities(canvas);
    }

    /// Advance the simulation by one frame without drawing: tick, rotation,
    /// spawning, particle motion, projection and the wireframe batch.
    pub fn step(&mut self) {
        self.tick += 1;
        self.rotation = Rotation::at_tick(self.tick, self.config.rot_vel_x, self.config.rot_vel_y);

        self.spawn_particle();

        for node in self.graph.nodes_mut() {
            node.screen = project(node.position, &self.rotation, &self.viewport);
        }
        for particle in &mut self.particles {
            particle.advance(&self.graph, &self.config, self.rng.as_mut());
            particle.project(&self.rotation, &self.viewport);
        }

        self.wireframe.clear();
        for (parent, child) in self.graph.edges() {
            self.wireframe
                .segment(self.graph[parent].screen.position(), self.graph[child].screen.position());
        }
    }

    /// One new particle per frame while below `density x node count`.
    fn spawn_particle(&mut self) {
        let cap = self.graph.len() as f64 * self.config.data_to_connections;
        if (self.particles.len() as f64) < cap {
            let particle = Particle::spawn(&self.graph, &self.config, self.rng.as_mut());
            self.entities.push(Entity::Particle(self.particles.len()));
            self.particles.push(particle);
        }
    }

    /// Farthest first, so nearer entities paint over farther ones.
    fn sort_entities(&mut self) {
        let graph = &self.graph;
        let particles = &self.particles;
        let depth = |e: &Entity| match *e {
            Entity::Node(id) => graph[id].screen.depth,
            Entity::Particle(i) => particles[i].screen.depth,
        };
        self.entities.sort_by(|a, b| depth(b).total_cmp(&depth(a)));
    }

    fn draw_entities<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        for &entity in &self.entities {
            match entity {
                Entity::Node(id) => {
                    let node = &self.graph[id];
                    let radius = (node.screen.scale * node.size).max(MIN_NODE_RADIUS);
                    canvas.fill_circle(node.screen.position(), radius, self.node_color(id));
                }
                Entity::Particle(i) => {
                    if !self.particles[i].take_draw_turn() {
                        continue;
                    }
                    let particle = &self.particles[i];
                    let from = particle.last_screen.unwrap_or(particle.screen.position());
                    canvas.stroke_line(
                        from,
                        particle.screen.position(),
                        particle.size * particle.screen.scale,
                        self.particle_color(particle),
                    );
                }
            }
        }
    }

    /// Root, terminal and inner nodes each have their own hue; nearer nodes
    /// are more opaque.
    pub fn node_color(&self, id: NodeId) -> Rgba {
        let node = &self.graph[id];
        let fog = depth_fog(node.screen.depth, self.config.most_distant()) as f32;

        if node.is_root() {
            self.config.root_color.with(NODE_LIGHTNESS, fog * 0.8).to_rgba()
        } else if node.terminal {
            self.config.end_color.with(NODE_LIGHTNESS, 0.2 + fog * 0.8).to_rgba()
        } else {
            self.config.connection_color.with(NODE_LIGHTNESS, 0.2 + fog * 0.8).to_rgba()
        }
    }

    fn particle_color(&self, particle: &Particle) -> Rgba {
        let fog = depth_fog(particle.screen.depth, self.config.most_distant()) as f32;
        self.config.data_color.with(DATA_LIGHTNESS, 0.2 + fog * 0.6).to_rgba()
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Nodes and particles in their current draw order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The edge batch built by the last [`step`](Self::step).
    pub fn wireframe(&self) -> &Path {
        &self.wireframe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};
    use crate::rng::seeded;

    fn scene(config: NetworkConfig) -> Scene {
        Scene::new(config, 800, 600, Box::new(seeded(42))).unwrap()
    }

    #[test]
    fn test_new_scene_lists_every_node() {
        let scene = scene(NetworkConfig::default());
        assert!(scene.graph().len() > 1);
        assert_eq!(scene.entities().len(), scene.graph().len());
        assert!(scene.particles().is_empty());
        assert_eq!(scene.tick(), 0);
    }

    #[test]
    fn test_one_particle_per_frame_up_to_cap() {
        // a terminal root: one node, cap of two particles
        let config = NetworkConfig::default().with_sizes(0.5, 1.0, 0.7).with_density(2.0);
        let mut scene = scene(config);
        assert_eq!(scene.graph().len(), 1);

        scene.step();
        assert_eq!(scene.particles().len(), 1);
        scene.step();
        assert_eq!(scene.particles().len(), 2);
        scene.step();
        assert_eq!(scene.particles().len(), 2);
        assert_eq!(scene.entities().len(), 3);
    }

    #[test]
    fn test_zero_density_spawns_nothing() {
        let mut scene = scene(NetworkConfig::default().with_density(0.0));
        for _ in 0..5 {
            scene.step();
        }
        assert!(scene.particles().is_empty());
    }

    #[test]
    fn test_rotation_follows_tick() {
        let config = NetworkConfig::default().with_rotation(0.01, 0.02);
        let mut scene = scene(config);
        for _ in 0..3 {
            scene.step();
        }
        assert_eq!(scene.tick(), 3);
        assert_eq!(scene.rotation(), Rotation::at_tick(3, 0.01, 0.02));
    }

    #[test]
    fn test_wireframe_has_one_segment_per_edge() {
        let mut scene = scene(NetworkConfig::default());
        scene.step();
        assert_eq!(scene.wireframe().len(), scene.graph().len() - 1);
    }

    #[test]
    fn test_frame_draw_order() {
        let mut scene = scene(NetworkConfig::default());
        let mut canvas = RecordingCanvas::new(800, 600);
        scene.frame(&mut canvas);
        let commands = canvas.take();

        assert_eq!(commands[0], DrawCommand::Composite(CompositeMode::SourceOver));
        assert!(matches!(commands[1], DrawCommand::FillRect { color, .. } if color == scene.config().repaint_color));
        assert_eq!(commands[2], DrawCommand::Composite(CompositeMode::Lighter));
        match &commands[3] {
            DrawCommand::StrokePath { segments, width, color } => {
                assert_eq!(segments.len(), scene.graph().len() - 1);
                assert_eq!(*width, 0.1);
                assert_eq!(*color, Rgba::opaque(0x88, 0x88, 0xff));
            }
            other => panic!("expected wireframe, got {:?}", other),
        }
        assert_eq!(commands[4], DrawCommand::Composite(CompositeMode::SourceOver));

        let circles = commands.iter().filter(|c| matches!(c, DrawCommand::FillCircle { .. })).count();
        assert_eq!(circles, scene.graph().len());
    }

    #[test]
    fn test_entities_sorted_far_to_near() {
        let mut scene = scene(NetworkConfig::default().with_rotation(0.3, 0.2));
        let mut canvas = RecordingCanvas::new(800, 600);
        for _ in 0..10 {
            scene.frame(&mut canvas);
        }
        let depths: Vec<f64> = scene
            .entities()
            .iter()
            .map(|e| match *e {
                Entity::Node(id) => scene.graph()[id].screen.depth,
                Entity::Particle(i) => scene.particles()[i].screen.depth,
            })
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_particles_hidden_during_grace() {
        // terminal root: the only particle is parked and always in grace
        let config = NetworkConfig::default().with_sizes(0.5, 1.0, 0.7);
        let mut scene = scene(config);
        let mut canvas = RecordingCanvas::new(800, 600);
        scene.frame(&mut canvas);
        scene.frame(&mut canvas);

        let strokes = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { segments, .. } if segments.len() == 1))
            .count();
        assert_eq!(strokes, 0);
    }

    #[test]
    fn test_root_color_uses_root_alpha() {
        let mut scene = scene(NetworkConfig::default());
        scene.step();
        // identity-ish rotation at tick 1: root depth 0, fog 1
        let root = scene.node_color(NodeId::ROOT);
        assert!((root.a - 0.8).abs() < 1e-6);
        let expected = scene.config().root_color.with(30.0, 0.8).to_rgba();
        assert_eq!((root.r, root.g, root.b), (expected.r, expected.g, expected.b));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = NetworkConfig::default().with_speed(-0.01, 0.0);
        let result = Scene::new(config, 800, 600, Box::new(seeded(42)));
        assert!(matches!(result, Err(ConfigError::Invalid { field: "baseSpeed", .. })));

        let config = NetworkConfig::default().with_sizes(5.0, 1.0, 1.0).with_spacing(50.0, 30.0, 0.0);
        assert!(Scene::new(config, 800, 600, Box::new(seeded(42))).is_err());
    }

    #[test]
    fn test_nan_depth_does_not_break_sort() {
        let mut scene = scene(NetworkConfig::default());
        scene.step();
        scene.graph.nodes_mut()[1].screen.depth = f64::NAN;
        scene.sort_entities();
        assert_eq!(scene.entities().len(), scene.graph().len());
    }

    #[test]
    fn test_vanish_point_override() {
        let mut config = NetworkConfig::default().with_sizes(0.5, 1.0, 0.7);
        config.vanish_point = Some([10.0, 20.0]);
        let mut scene = scene(config);
        assert_eq!(scene.viewport().vanish_point, DVec2::new(10.0, 20.0));

        let mut canvas = RecordingCanvas::new(800, 600);
        scene.resize(&mut canvas, 640, 480);
        assert_eq!(scene.viewport().vanish_point, DVec2::new(320.0, 240.0));
    }
}
