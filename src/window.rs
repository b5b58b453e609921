//! The winit frontend.
//!
//! Startup follows the page-load sequence: the window first shows the
//! loading fill, and the network is generated on the next redraw. From then
//! on every redraw runs one animator frame, which requests the next redraw
//! through [`RedrawPump`].
//!
//! - Left click: regenerate the network, also during the loading frame.
//! - Resize: resize the canvas and recentre the camera.
//! - Close: cancel the loop and exit.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::animation::{Animator, FramePump};
use crate::canvas::{Canvas, PixelCanvas};
use crate::config::NetworkConfig;
use crate::error::SimulationError;
use crate::gpu::GpuState;
use crate::rng;
use crate::scene::Scene;

/// Maps frame requests onto winit redraw requests.
pub struct RedrawPump<'a>(pub &'a Window);

impl FramePump for RedrawPump<'_> {
    fn schedule_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Window settings handed over by [`NetworkSimulation`](crate::NetworkSimulation).
pub(crate) struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
}

pub(crate) struct App {
    config: NetworkConfig,
    settings: WindowSettings,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    canvas: PixelCanvas,
    /// `None` until the network has been generated.
    animator: Option<Animator>,
    loading_shown: bool,
    shown_fps: u32,
    error: Option<SimulationError>,
}

impl App {
    pub fn new(config: NetworkConfig, settings: WindowSettings) -> Self {
        Self {
            config,
            canvas: PixelCanvas::new(settings.width, settings.height),
            settings,
            window: None,
            gpu_state: None,
            animator: None,
            loading_shown: false,
            shown_fps: 0,
            error: None,
        }
    }

    /// The first error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<SimulationError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SimulationError) {
        log::error!("{}", error);
        if let Some(animator) = &self.animator {
            animator.token().cancel();
        }
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.settings.title.as_str())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu_state = pollster::block_on(GpuState::new(window.clone()))?;

        let size = window.inner_size();
        self.canvas = PixelCanvas::new(size.width.max(1), size.height.max(1));
        Scene::paint_loading(&mut self.canvas, &self.config);

        window.request_redraw();
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let mut pump = RedrawPump(&window);

        if let Some(animator) = &mut self.animator {
            animator.frame(&mut self.canvas, &mut pump);
        } else if !self.loading_shown {
            // show the loading fill for one frame, generate on the next
            self.loading_shown = true;
            window.request_redraw();
        } else if let Err(e) = self.generate(&mut pump) {
            self.fail(event_loop, e);
            return;
        }

        self.update_title(&window);
        self.present(event_loop);
    }

    /// Grow the first network and start the loop.
    fn generate(&mut self, pump: &mut dyn FramePump) -> Result<(), SimulationError> {
        let scene = Scene::new(
            self.config.clone(),
            self.canvas.width(),
            self.canvas.height(),
            rng::boxed(self.settings.seed),
        )?;
        let animator = self.animator.insert(Animator::new(scene));
        animator.start(pump);
        Ok(())
    }

    fn click(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if let Err(e) = self.handle_click(&mut RedrawPump(&window)) {
            self.fail(event_loop, e);
        }
    }

    /// Left click: regenerate, or generate right away if the loading fill
    /// is still up.
    fn handle_click(&mut self, pump: &mut dyn FramePump) -> Result<(), SimulationError> {
        match &mut self.animator {
            Some(animator) => {
                animator.reset(pump);
                Ok(())
            }
            None => {
                self.loading_shown = true;
                self.generate(pump)
            }
        }
    }

    fn present(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        let (width, height) = (self.canvas.width(), self.canvas.height());
        match gpu_state.render(self.canvas.as_bytes(), width, height) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                gpu_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                if let Some(animator) = &self.animator {
                    animator.token().cancel();
                }
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.resize(size);
        }

        match &mut self.animator {
            Some(animator) => animator.resize(&mut self.canvas, size.width, size.height),
            None => {
                self.canvas = PixelCanvas::new(size.width, size.height);
                Scene::paint_loading(&mut self.canvas, &self.config);
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn update_title(&mut self, window: &Window) {
        let Some(animator) = &self.animator else {
            return;
        };
        let fps = animator.clock().fps().round() as u32;
        if fps != self.shown_fps {
            self.shown_fps = fps;
            window.set_title(&format!("{} - {} fps", self.settings.title, fps));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(animator) = &self.animator {
                    animator.token().cancel();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(physical_size);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.click(event_loop);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}
