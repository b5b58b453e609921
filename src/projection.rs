//! Rotation and perspective projection.
//!
//! Every frame the whole network is rotated about the X axis, then about the
//! Y axis, pushed `camera_distance` away from the viewer and divided by depth:
//!
//! ```text
//! y' = y cos(rx) - z sin(rx)        z' = z cos(rx) + y sin(rx)
//! z" = z' cos(ry) - x sin(ry)       x' = x cos(ry) + z' sin(ry)
//! scale = focal_length / (z" + camera_distance)
//! screen = vanish_point + (x', y') * scale
//! ```
//!
//! `z"` is kept as the entity's depth for sorting and fog. The divide is not
//! guarded: a point whose rotated depth reaches `-camera_distance` gets an
//! unbounded (or non-finite) scale. Drawing code skips non-finite geometry.

use glam::{DVec2, DVec3};

/// Screen-space state of an entity for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    /// Post-rotation Z, before the camera offset. Larger is farther.
    pub depth: f64,
    /// Perspective factor applied to sizes.
    pub scale: f64,
}

impl ScreenPoint {
    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Cached sines and cosines of the two rotation angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub sin_x: f64,
    pub cos_x: f64,
    pub sin_y: f64,
    pub cos_y: f64,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation {
        sin_x: 0.0,
        cos_x: 1.0,
        sin_y: 0.0,
        cos_y: 1.0,
    };

    pub fn from_angles(x: f64, y: f64) -> Self {
        let (sin_x, cos_x) = x.sin_cos();
        let (sin_y, cos_y) = y.sin_cos();
        Self { sin_x, cos_x, sin_y, cos_y }
    }

    /// Rotation after `tick` frames at fixed angular velocities. Angles grow
    /// without wrapping; only their sines and cosines are used.
    pub fn at_tick(tick: u64, vel_x: f64, vel_y: f64) -> Self {
        let t = tick as f64;
        Self::from_angles(t * vel_x, t * vel_y)
    }

    /// Rotate about X, then about Y.
    #[inline]
    pub fn apply(&self, p: DVec3) -> DVec3 {
        let y = p.y * self.cos_x - p.z * self.sin_x;
        let z = p.z * self.cos_x + p.y * self.sin_x;

        let depth = z * self.cos_y - p.x * self.sin_y;
        let x = p.x * self.cos_y + z * self.sin_y;

        DVec3::new(x, y, depth)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Canvas dimensions and camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub vanish_point: DVec2,
    pub focal_length: f64,
    /// Offset added to rotated depth before the perspective divide.
    pub camera_distance: f64,
}

impl Viewport {
    /// Viewport with the vanishing point at the centre.
    pub fn new(width: u32, height: u32, focal_length: f64, camera_distance: f64) -> Self {
        Self {
            width,
            height,
            vanish_point: Self::centre(width, height),
            focal_length,
            camera_distance,
        }
    }

    /// Update dimensions and recentre the vanishing point.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.vanish_point = Self::centre(width, height);
    }

    fn centre(width: u32, height: u32) -> DVec2 {
        DVec2::new(width as f64 / 2.0, height as f64 / 2.0)
    }
}

/// Project a world-space point. Pure: the point itself is untouched.
#[inline]
pub fn project(position: DVec3, rotation: &Rotation, viewport: &Viewport) -> ScreenPoint {
    let rotated = rotation.apply(position);
    let scale = viewport.focal_length / (rotated.z + viewport.camera_distance);

    ScreenPoint {
        x: viewport.vanish_point.x + rotated.x * scale,
        y: viewport.vanish_point.y + rotated.y * scale,
        depth: rotated.z,
        scale,
    }
}
