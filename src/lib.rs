//! # nodeweave - procedural 3D node networks
//!
//! Grows a random tree of nodes in 3D space, spins it slowly in front of a
//! perspective camera and sends small data particles flowing along its
//! edges, from the root out to the leaves and back.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nodeweave::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     NetworkSimulation::new()
//!         .with_config(NetworkConfig::default().with_connections(3, 5))
//!         .with_seed(42)
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Generation
//!
//! [`graph::generate`] grows the network breadth-first from a single root.
//! Each node tries to place a few children on a random sphere around it,
//! rejecting spots outside the world radius or too close to any other node.
//! Children shrink by `sizeMultiplier`, and nodes smaller than `minSize`
//! stop branching, so the tree depth is bounded.
//!
//! ### Frames
//!
//! A [`Scene`] owns one network and its particles. Each frame it repaints
//! the background, advances the rotation, spawns at most one particle,
//! strokes every edge as one additive wireframe batch and then draws nodes
//! and particles far-to-near.
//!
//! ### Hosts
//!
//! The [`Animator`] never loops on its own: a host-provided [`FramePump`]
//! schedules each next frame. The window frontend maps it onto redraw
//! requests; tests and [`NetworkSimulation::render_snapshot`] step frames by
//! hand with a [`ManualPump`].
//!
//! Drawing goes through the [`Canvas`] trait. [`PixelCanvas`] rasterizes in
//! software (and is what the window shows); [`RecordingCanvas`] records
//! commands for inspection.
//!
//! ## Configuration
//!
//! | Group | Options |
//! |-------|---------|
//! | Growth | `range`, `baseConnections`, `addedConnections`, `connectionAttempts` |
//! | Sizes | `baseSize`, `minSize`, `sizeMultiplier`, `dataToConnectionSize` |
//! | Spacing | `baseDist`, `addedDist`, `allowedDist` |
//! | Particles | `dataToConnections`, `baseSpeed`, `addedSpeed` |
//! | Camera | `rotVelX`, `rotVelY`, `depth`, `focalLength`, `vanishPoint` |
//! | Colors | `repaintColor`, `loadingColor`, `connectionColor`, `rootColor`, `endColor`, `dataColor`, `wireframeColor`, `wireframeWidth` |
//!
//! See [`NetworkConfig`] for defaults; configurations load from and save to
//! JSON with these keys.

pub mod animation;
pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
mod gpu;
pub mod graph;
pub mod particle;
pub mod projection;
pub mod rng;
pub mod scene;
mod shader;
mod simulation;
pub mod time;
mod window;

pub use animation::{Animator, CancellationToken, FrameControl, FramePump, LoopState, ManualPump};
pub use canvas::{Canvas, CompositeMode, DrawCommand, Path, PixelCanvas, RecordingCanvas};
pub use color::{Hsla, HuePreset, Rgba};
pub use config::NetworkConfig;
pub use error::{ConfigError, GpuError, SimulationError};
pub use glam::{DVec2, DVec3};
pub use graph::{GraphStats, Node, NodeGraph, NodeId};
pub use particle::Particle;
pub use projection::{Rotation, ScreenPoint, Viewport};
pub use rng::{RandomSource, SequenceRandom};
pub use scene::{Entity, Scene};
pub use simulation::NetworkSimulation;
pub use window::RedrawPump;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use nodeweave::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animation::{Animator, FrameControl, FramePump, ManualPump};
    pub use crate::canvas::{Canvas, PixelCanvas};
    pub use crate::config::NetworkConfig;
    pub use crate::error::SimulationError;
    pub use crate::rng::{RandomSource, SequenceRandom};
    pub use crate::scene::Scene;
    pub use crate::simulation::NetworkSimulation;
    pub use crate::time::FrameClock;
    pub use crate::{DVec2, DVec3};
}
