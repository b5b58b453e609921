//! Data particles flowing along the network's edges.
//!
//! A particle always travels one directed edge, from a node to one of its
//! children. Each frame its progress grows by its speed and its position and
//! size are interpolated between the two endpoints. On arrival it continues
//! down a random child of the node it reached; at a terminal node it returns
//! to the root and hides for [`GRACE_FRAMES`] frames so the jump back is
//! never drawn.

use glam::{DVec2, DVec3};

use crate::config::NetworkConfig;
use crate::graph::{NodeGraph, NodeId};
use crate::projection::{project, Rotation, ScreenPoint, Viewport};
use crate::rng::RandomSource;

/// Frames a particle stays hidden after jumping back to the root.
pub const GRACE_FRAMES: u8 = 2;

#[derive(Debug, Clone)]
pub struct Particle {
    /// Edge fraction covered per frame. Fixed for the particle's lifetime.
    speed: f64,
    source: NodeId,
    /// `None` only while parked on a root that has no children.
    target: Option<NodeId>,
    progress: f64,
    origin: DVec3,
    delta: DVec3,
    origin_size: f64,
    delta_size: f64,
    pub position: DVec3,
    pub size: f64,
    pub screen: ScreenPoint,
    /// Screen position before the latest projection; `None` until projected.
    pub last_screen: Option<DVec2>,
    grace: u8,
}

impl Particle {
    /// Create a particle at the root and send it down a random edge.
    pub fn spawn(graph: &NodeGraph, config: &NetworkConfig, rng: &mut dyn RandomSource) -> Self {
        let root = graph.root();
        let mut particle = Self {
            speed: rng.spread(config.base_speed, config.added_speed),
            source: NodeId::ROOT,
            target: None,
            progress: 0.0,
            origin: root.position,
            delta: DVec3::ZERO,
            origin_size: root.size,
            delta_size: 0.0,
            position: root.position,
            size: root.size * config.data_to_connection_size,
            screen: ScreenPoint::default(),
            last_screen: None,
            grace: 0,
        };
        particle.retarget(graph, NodeId::ROOT, config, rng);
        particle
    }

    /// Move one frame along the current edge. Progress that leaves `[0, 1)`
    /// in either direction snaps to the edge end and retargets.
    pub fn advance(&mut self, graph: &NodeGraph, config: &NetworkConfig, rng: &mut dyn RandomSource) {
        self.progress += self.speed;

        if (0.0..1.0).contains(&self.progress) {
            self.position = self.origin + self.delta * self.progress;
            self.size = (self.origin_size + self.delta_size * self.progress) * config.data_to_connection_size;
        } else {
            let arrived = self.target.unwrap_or(self.source);
            self.retarget(graph, arrived, config, rng);
        }
    }

    /// Start a new edge from `from`. A terminal `from` sends the particle
    /// back to the root instead.
    pub fn retarget(
        &mut self,
        graph: &NodeGraph,
        from: NodeId,
        config: &NetworkConfig,
        rng: &mut dyn RandomSource,
    ) {
        if graph[from].terminal {
            self.return_to_root(graph, config, rng);
        } else {
            self.attach(graph, from, config, rng);
        }
    }

    fn return_to_root(&mut self, graph: &NodeGraph, config: &NetworkConfig, rng: &mut dyn RandomSource) {
        if graph.root().terminal {
            self.park(graph, config);
        } else {
            self.attach(graph, NodeId::ROOT, config, rng);
        }
        self.grace = GRACE_FRAMES;
    }

    fn attach(&mut self, graph: &NodeGraph, from: NodeId, config: &NetworkConfig, rng: &mut dyn RandomSource) {
        let node = &graph[from];
        let target = node.children[rng.index(node.children.len())];
        let next = &graph[target];

        self.source = from;
        self.target = Some(target);
        self.origin = node.position;
        self.origin_size = node.size;
        self.delta = next.position - node.position;
        self.delta_size = next.size - node.size;
        self.progress = 0.0;
        self.position = node.position;
        self.size = node.size * config.data_to_connection_size;
    }

    /// Sit on a childless root with nowhere to go.
    fn park(&mut self, graph: &NodeGraph, config: &NetworkConfig) {
        let root = graph.root();
        self.source = NodeId::ROOT;
        self.target = None;
        self.origin = root.position;
        self.origin_size = root.size;
        self.delta = DVec3::ZERO;
        self.delta_size = 0.0;
        self.progress = 0.0;
        self.position = root.position;
        self.size = root.size * config.data_to_connection_size;
    }

    /// Project the current position, keeping the previous screen point as
    /// the start of the trail.
    pub fn project(&mut self, rotation: &Rotation, viewport: &Viewport) {
        let next = project(self.position, rotation, viewport);
        self.last_screen = Some(match self.last_screen {
            Some(_) => self.screen.position(),
            None => next.position(),
        });
        self.screen = next;
    }

    /// Consume one frame of the grace countdown. Returns `true` when the
    /// particle may be drawn this frame.
    pub fn take_draw_turn(&mut self) -> bool {
        if self.grace > 0 {
            self.grace -= 1;
            false
        } else {
            true
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    #[inline]
    pub fn in_grace(&self) -> bool {
        self.grace > 0
    }
}
