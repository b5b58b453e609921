//! Simulation builder and runner

use std::path::Path;

use winit::event_loop::{ControlFlow, EventLoop};

use crate::animation::Animator;
use crate::canvas::PixelCanvas;
use crate::config::NetworkConfig;
use crate::error::SimulationError;
use crate::rng;
use crate::scene::Scene;
use crate::window::{App, WindowSettings};

/// A node-network animation builder.
///
/// Use method chaining to configure, then call `.run()` to open a window or
/// `.render_snapshot()` to render frames to a PNG without one.
pub struct NetworkSimulation {
    config: NetworkConfig,
    seed: Option<u64>,
    title: String,
    width: u32,
    height: u32,
}

impl NetworkSimulation {
    /// Create a simulation with the default network options.
    pub fn new() -> Self {
        Self {
            config: NetworkConfig::default(),
            seed: None,
            title: "nodeweave".to_string(),
            width: 1280,
            height: 720,
        }
    }

    /// Replace all network options.
    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the random source so the same network is generated every run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initial window (or snapshot) size in pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Run the animation in a window. This blocks until the window is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let settings = WindowSettings {
            title: self.title,
            width: self.width,
            height: self.height,
            seed: self.seed,
        };
        let mut app = App::new(self.config, settings);
        event_loop.run_app(&mut app)?;

        match app.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Generate a network, run `frames` frames on an offscreen canvas and
    /// return the canvas.
    pub fn render_frames(&self, frames: u64) -> Result<PixelCanvas, SimulationError> {
        let scene = Scene::new(self.config.clone(), self.width, self.height, rng::boxed(self.seed))?;
        let mut canvas = PixelCanvas::new(self.width, self.height);
        Scene::paint_loading(&mut canvas, &self.config);

        let mut animator = Animator::new(scene);
        let drawn = animator.run_frames(&mut canvas, frames);
        log::info!(
            "Rendered {} frames: {} nodes, {} particles",
            drawn,
            animator.scene().graph().len(),
            animator.scene().particles().len()
        );
        Ok(canvas)
    }

    /// Render `frames` frames offscreen and write the last one to `path` as PNG.
    pub fn render_snapshot(&self, frames: u64, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let canvas = self.render_frames(frames)?;
        canvas.save_png(path.as_ref())?;
        log::info!("Snapshot written to {}", path.as_ref().display());
        Ok(())
    }
}

impl Default for NetworkSimulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_builder_defaults() {
        let sim = NetworkSimulation::new();
        assert_eq!(sim.config(), &NetworkConfig::default());
        assert_eq!((sim.width, sim.height), (1280, 720));
        assert!(sim.seed.is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_rendering() {
        let config = NetworkConfig::default().with_sizes(5.0, 1.0, 1.5);
        let result = NetworkSimulation::new().with_config(config).render_frames(1);
        assert!(matches!(
            result,
            Err(SimulationError::Config(ConfigError::Invalid { field: "sizeMultiplier", .. }))
        ));
    }

    #[test]
    fn test_zero_frames_shows_loading_fill() {
        let canvas = NetworkSimulation::new()
            .with_seed(1)
            .with_window_size(32, 24)
            .render_frames(0)
            .unwrap();
        assert_eq!(canvas.pixel(16, 12), [0x22, 0x22, 0x22, 255]);
    }

    #[test]
    fn test_frames_repaint_background() {
        // a lone terminal root: nothing reaches the corner
        let config = NetworkConfig::default().with_sizes(0.5, 1.0, 0.7);
        let canvas = NetworkSimulation::new()
            .with_config(config)
            .with_seed(1)
            .with_window_size(64, 48)
            .render_frames(3)
            .unwrap();
        assert_eq!(canvas.pixel(0, 0), [0x11, 0x11, 0x11, 255]);
    }

    #[test]
    fn test_snapshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        NetworkSimulation::new()
            .with_seed(3)
            .with_window_size(80, 60)
            .render_snapshot(5, &path)
            .unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (80, 60));
    }
}
