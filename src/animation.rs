//! The self-rescheduling animation loop.
//!
//! The host owns the frame timing. It provides a [`FramePump`], and the
//! [`Animator`] asks it for exactly one more frame at the end of every frame
//! it runs. Nothing loops or blocks here: a windowed host maps the pump to a
//! redraw request, while tests and headless rendering use a [`ManualPump`]
//! and step frames by hand.
//!
//! ```ignore
//! let mut pump = ManualPump::default();
//! let mut animator = Animator::new(scene);
//! animator.start(&mut pump);
//!
//! while pump.take() {
//!     animator.frame(&mut canvas, &mut pump);
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::canvas::Canvas;
use crate::scene::Scene;
use crate::time::FrameClock;

/// Result of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Another frame has been scheduled.
    Continue,
    /// Nothing was scheduled; the loop is over.
    Stop,
}

/// Host hook that schedules the next frame callback.
pub trait FramePump {
    fn schedule_frame(&mut self);
}

/// Shared flag that stops the loop at its next frame.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A pump that just counts requests, for stepping frames by hand.
#[derive(Debug, Default)]
pub struct ManualPump {
    pending: u32,
    scheduled: u64,
}

impl ManualPump {
    /// Consume one scheduled frame. Returns `false` if none is pending.
    pub fn take(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    /// Frames scheduled but not yet taken.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Frames scheduled over the pump's lifetime.
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }
}

impl FramePump for ManualPump {
    fn schedule_frame(&mut self) {
        self.pending += 1;
        self.scheduled += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not started yet.
    Idle,
    /// A frame is scheduled.
    Running,
    /// Cancelled. Never restarts.
    Stopped,
}

/// Drives a [`Scene`] one frame per pump callback.
pub struct Animator {
    scene: Scene,
    state: LoopState,
    token: CancellationToken,
    clock: FrameClock,
}

impl Animator {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            state: LoopState::Idle,
            token: CancellationToken::new(),
            clock: FrameClock::new(),
        }
    }

    /// Schedule the first frame. Starting a running loop does nothing, so
    /// there is never more than one frame in flight. Returns whether a frame
    /// was scheduled.
    pub fn start(&mut self, pump: &mut dyn FramePump) -> bool {
        match self.state {
            LoopState::Running | LoopState::Stopped => false,
            LoopState::Idle if self.token.is_cancelled() => {
                self.state = LoopState::Stopped;
                false
            }
            LoopState::Idle => {
                self.state = LoopState::Running;
                pump.schedule_frame();
                log::debug!("Animation loop started");
                true
            }
        }
    }

    /// Run one scheduled frame and schedule the next, unless cancelled.
    pub fn frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C, pump: &mut dyn FramePump) -> FrameControl {
        if self.state != LoopState::Running {
            return FrameControl::Stop;
        }
        if self.token.is_cancelled() {
            self.state = LoopState::Stopped;
            log::debug!("Animation loop stopped after {} frames", self.clock.frame());
            return FrameControl::Stop;
        }

        self.scene.frame(canvas);
        if let Some(fps) = self.clock.tick() {
            log::debug!("{:.1} fps, {} particles", fps, self.scene.particles().len());
        }

        pump.schedule_frame();
        FrameControl::Continue
    }

    /// Regenerate the network and make sure the loop is running.
    pub fn reset(&mut self, pump: &mut dyn FramePump) {
        self.scene.reset();
        self.start(pump);
    }

    /// Resize the canvas and recentre the camera. The network is kept.
    pub fn resize<C: Canvas + ?Sized>(&mut self, canvas: &mut C, width: u32, height: u32) {
        self.scene.resize(canvas, width, height);
    }

    /// Start the loop if needed and run up to `frames` frames with a
    /// [`ManualPump`]. Returns the number of frames drawn.
    pub fn run_frames<C: Canvas + ?Sized>(&mut self, canvas: &mut C, frames: u64) -> u64 {
        let mut pump = ManualPump::default();
        if self.state == LoopState::Running {
            pump.schedule_frame();
        } else {
            self.start(&mut pump);
        }

        let mut drawn = 0;
        while drawn < frames && pump.take() {
            if self.frame(canvas, &mut pump) == FrameControl::Stop {
                break;
            }
            drawn += 1;
        }
        drawn
    }

    /// Handle that stops the loop from anywhere.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::config::NetworkConfig;
    use crate::rng::seeded;

    fn animator() -> Animator {
        let scene = Scene::new(NetworkConfig::default(), 320, 240, Box::new(seeded(5))).unwrap();
        Animator::new(scene)
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut animator = animator();
        let mut pump = ManualPump::default();

        assert!(animator.start(&mut pump));
        assert!(!animator.start(&mut pump));
        assert_eq!(pump.pending(), 1);
        assert_eq!(animator.state(), LoopState::Running);
    }

    #[test]
    fn test_each_frame_schedules_exactly_one_more() {
        let mut animator = animator();
        let mut pump = ManualPump::default();
        let mut canvas = RecordingCanvas::new(320, 240);
        animator.start(&mut pump);

        for _ in 0..25 {
            assert!(pump.take());
            assert_eq!(animator.frame(&mut canvas, &mut pump), FrameControl::Continue);
            assert_eq!(pump.pending(), 1);
        }
        assert_eq!(pump.scheduled(), 26);
        assert_eq!(animator.scene().tick(), 25);
    }

    #[test]
    fn test_reset_while_running_does_not_double_schedule() {
        let mut animator = animator();
        let mut pump = ManualPump::default();
        let mut canvas = RecordingCanvas::new(320, 240);
        animator.start(&mut pump);
        pump.take();
        animator.frame(&mut canvas, &mut pump);

        animator.reset(&mut pump);
        assert_eq!(pump.pending(), 1);
        assert!(animator.scene().particles().is_empty());
    }

    #[test]
    fn test_reset_before_start_starts_loop() {
        let mut animator = animator();
        let mut pump = ManualPump::default();
        animator.reset(&mut pump);
        assert_eq!(animator.state(), LoopState::Running);
        assert_eq!(pump.pending(), 1);
    }

    #[test]
    fn test_cancel_stops_without_rescheduling() {
        let mut animator = animator();
        let mut pump = ManualPump::default();
        let mut canvas = RecordingCanvas::new(320, 240);
        animator.start(&mut pump);

        animator.token().cancel();
        pump.take();
        assert_eq!(animator.frame(&mut canvas, &mut pump), FrameControl::Stop);
        assert_eq!(pump.pending(), 0);
        assert_eq!(animator.state(), LoopState::Stopped);
        assert!(canvas.commands().is_empty());

        // stays stopped
        assert!(!animator.start(&mut pump));
        animator.reset(&mut pump);
        assert_eq!(pump.pending(), 0);
    }

    #[test]
    fn test_frame_before_start_draws_nothing() {
        let mut animator = animator();
        let mut pump = ManualPump::default();
        let mut canvas = RecordingCanvas::new(320, 240);
        assert_eq!(animator.frame(&mut canvas, &mut pump), FrameControl::Stop);
        assert_eq!(pump.scheduled(), 0);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn test_run_frames() {
        let mut animator = animator();
        let mut canvas = RecordingCanvas::new(320, 240);
        assert_eq!(animator.run_frames(&mut canvas, 12), 12);
        assert_eq!(animator.run_frames(&mut canvas, 3), 3);
        assert_eq!(animator.scene().tick(), 15);
        assert_eq!(animator.clock().frame(), 15);
    }
}
