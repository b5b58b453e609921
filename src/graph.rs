//! Node arena and the procedural network generator.
//!
//! The network is a tree stored flat in a [`NodeGraph`]: nodes live in a
//! `Vec`, parents hold the [`NodeId`]s of their children and the root is
//! always id 0. Generation grows the tree breadth-first from a worklist:
//!
//! 1. A node smaller than `min_size` is terminal.
//! 2. Otherwise pick a branch count in `[base, base + added)`.
//! 3. Sample candidate positions on a random sphere around the node, at a
//!    random distance in `[base_dist, base_dist + added_dist)`.
//! 4. Reject candidates outside the world sphere (`range`) or closer than
//!    `allowed_dist` to any existing node or to a candidate already accepted
//!    for this node.
//! 5. Stop once enough candidates pass or the attempts run out. A node with
//!    no accepted candidates is terminal.
//! 6. Accepted candidates become children of size `parent * size_multiplier`
//!    and join the back of the worklist.
//!
//! Running out of room is a normal outcome, never an error.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};
use std::ops::Index;
use std::time::Instant;

use glam::DVec3;

use crate::config::NetworkConfig;
use crate::projection::ScreenPoint;
use crate::rng::RandomSource;

/// Index of a node in its [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root is always the first node.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A point in the network.
#[derive(Debug, Clone)]
pub struct Node {
    pub position: DVec3,
    pub size: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Distance from the root in edges.
    pub level: u32,
    /// Set when the node has no children.
    pub terminal: bool,
    /// Projection from the most recent frame.
    pub screen: ScreenPoint,
}

impl Node {
    fn new(position: DVec3, size: f64, parent: Option<NodeId>, level: u32) -> Self {
        Self {
            position,
            size: if size > 0.0 { size } else { 0.1 },
            parent,
            children: Vec::new(),
            level,
            terminal: false,
            screen: ScreenPoint::default(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Summary of a generated network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphStats {
    pub nodes: usize,
    pub terminal: usize,
    pub max_level: u32,
}

/// Arena of nodes forming a single tree rooted at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct NodeGraph {
    nodes: Vec<Node>,
}

impl NodeGraph {
    /// A graph holding only an undeveloped root.
    pub fn with_root(origin: DVec3, size: f64) -> Self {
        Self {
            nodes: vec![Node::new(origin, size, None, 0)],
        }
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Every parent-child pair.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.iter()
            .flat_map(|(id, node)| node.children.iter().map(move |&child| (id, child)))
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.nodes.len(),
            terminal: self.nodes.iter().filter(|n| n.terminal).count(),
            max_level: self.nodes.iter().map(|n| n.level).max().unwrap_or(0),
        }
    }

    fn push_child(&mut self, parent: NodeId, position: DVec3, size: f64) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let level = self.nodes[parent.index()].level + 1;
        self.nodes.push(Node::new(position, size, Some(parent), level));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Whether `candidate` keeps the minimum spacing to every node.
    fn has_room(&self, candidate: DVec3, square_allowed: f64) -> bool {
        self.nodes
            .iter()
            .all(|n| n.position.distance_squared(candidate) >= square_allowed)
    }
}

impl Index<NodeId> for NodeGraph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// Grow a network from a single root at `origin`.
pub fn generate(
    origin: DVec3,
    initial_size: f64,
    config: &NetworkConfig,
    rng: &mut dyn RandomSource,
) -> NodeGraph {
    let started = Instant::now();
    let mut graph = NodeGraph::with_root(origin, initial_size);
    let mut worklist = VecDeque::from([NodeId::ROOT]);

    while let Some(id) = worklist.pop_front() {
        let links = sample_links(&graph, id, config, rng);
        if links.is_empty() {
            graph.nodes[id.index()].terminal = true;
            continue;
        }

        let child_size = graph[id].size * config.size_multiplier;
        for position in links {
            worklist.push_back(graph.push_child(id, position, child_size));
        }
    }

    let stats = graph.stats();
    log::info!(
        "Generated network: {} nodes, {} terminal, depth {} in {:.1}ms",
        stats.nodes,
        stats.terminal,
        stats.max_level,
        started.elapsed().as_secs_f64() * 1000.0
    );
    graph
}

/// Accepted child positions for `id`, empty if the node does not branch.
fn sample_links(
    graph: &NodeGraph,
    id: NodeId,
    config: &NetworkConfig,
    rng: &mut dyn RandomSource,
) -> Vec<DVec3> {
    let node = &graph[id];
    if node.size < config.min_size {
        return Vec::new();
    }

    let wanted = config.base_connections
        + (rng.next_f64() * config.added_connections as f64) as u32;
    let square_range = config.square_range();
    let square_allowed = config.square_allowed();
    let mut links: Vec<DVec3> = Vec::with_capacity(wanted as usize);

    for _ in 0..config.connection_attempts {
        if links.len() >= wanted as usize {
            break;
        }

        let candidate = node.position + random_offset(config, rng);
        if candidate.length_squared() >= square_range {
            continue;
        }
        if !graph.has_room(candidate, square_allowed) {
            continue;
        }
        if links
            .iter()
            .any(|l| l.distance_squared(candidate) < square_allowed)
        {
            continue;
        }
        links.push(candidate);
    }

    links
}

/// Random offset on a sphere of random radius.
fn random_offset(config: &NetworkConfig, rng: &mut dyn RandomSource) -> DVec3 {
    let alpha = rng.next_f64() * PI;
    let beta = rng.next_f64() * TAU;
    let len = rng.spread(config.base_dist, config.added_dist);

    let (sin_a, cos_a) = alpha.sin_cos();
    let (sin_b, cos_b) = beta.sin_cos();
    DVec3::new(len * cos_a * sin_b, len * sin_a * sin_b, len * cos_b)
}
