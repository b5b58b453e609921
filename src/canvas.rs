//! Drawing surfaces.
//!
//! The renderer only talks to the [`Canvas`] trait: filled rectangles, filled
//! circles and stroked line segments, composited either normally or
//! additively. Two surfaces ship with the crate:
//!
//! - [`PixelCanvas`] rasterizes into an RGBA image in memory. The window
//!   uploads it to the GPU each frame; snapshots encode it as PNG.
//! - [`RecordingCanvas`] keeps a list of [`DrawCommand`]s, for inspecting
//!   what a frame drew without any pixels.

use std::path::Path as FsPath;

use glam::DVec2;
use image::{ImageResult, Rgba as Pixel, RgbaImage};

use crate::color::Rgba;

/// How new drawing combines with what is already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Standard alpha blending.
    #[default]
    SourceOver,
    /// Colors add up, saturating at white.
    Lighter,
}

/// A batch of independent line segments stroked together.
#[derive(Debug, Clone, Default)]
pub struct Path {
    segments: Vec<(DVec2, DVec2)>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&mut self, from: DVec2, to: DVec2) {
        self.segments.push((from, to));
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn segments(&self) -> &[(DVec2, DVec2)] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// The drawing operations the network renderer needs.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Change the surface size. Previous content is discarded.
    fn resize(&mut self, width: u32, height: u32);

    fn set_composite(&mut self, mode: CompositeMode);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Stroke every segment of `path` with one width and color.
    fn stroke_path(&mut self, path: &Path, width: f64, color: Rgba);

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        let mut path = Path::new();
        path.segment(from, to);
        self.stroke_path(&path, width, color);
    }

    /// Cover the whole surface with `color`.
    fn fill(&mut self, color: Rgba) {
        let (w, h) = (self.width() as f64, self.height() as f64);
        self.fill_rect(0.0, 0.0, w, h, color);
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize { width: u32, height: u32 },
    Composite(CompositeMode),
    FillRect { x: f64, y: f64, width: f64, height: f64, color: Rgba },
    FillCircle { center: DVec2, radius: f64, color: Rgba },
    StrokePath { segments: Vec<(DVec2, DVec2)>, width: f64, color: Rgba },
}

/// Canvas that records commands instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Return and forget everything recorded so far.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.commands.push(DrawCommand::Composite(mode));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { x, y, width, height, color });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_path(&mut self, path: &Path, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::StrokePath {
            segments: path.segments().to_vec(),
            width,
            color,
        });
    }
}

/// Software rasterizer over an RGBA image.
///
/// Shapes are anti-aliased by pixel coverage. Strokes thinner than a pixel
/// are drawn one pixel wide with proportionally reduced alpha. Geometry with
/// non-finite coordinates is skipped.
pub struct PixelCanvas {
    image: RgbaImage,
    composite: CompositeMode,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Pixel([0, 0, 0, 255])),
            composite: CompositeMode::SourceOver,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA8 rows, top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn save_png(&self, path: impl AsRef<FsPath>) -> ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    /// Blend `color` into one pixel with the given coverage.
    fn blend(&mut self, x: u32, y: u32, color: [f32; 4], coverage: f32) {
        let sa = color[3] * coverage;
        if sa <= 0.0 {
            return;
        }
        let mode = self.composite;
        let px = self.image.get_pixel_mut(x, y);
        let da = px.0[3] as f32 / 255.0;

        let out_a = match mode {
            CompositeMode::SourceOver => sa + da * (1.0 - sa),
            CompositeMode::Lighter => (sa + da).min(1.0),
        };
        if out_a <= 0.0 {
            return;
        }

        for c in 0..3 {
            let d = px.0[c] as f32 / 255.0;
            let premultiplied = match mode {
                CompositeMode::SourceOver => color[c] * sa + d * da * (1.0 - sa),
                CompositeMode::Lighter => (color[c] * sa + d * da).min(1.0),
            };
            px.0[c] = ((premultiplied / out_a).min(1.0) * 255.0).round() as u8;
        }
        px.0[3] = (out_a * 255.0).round() as u8;
    }

    /// Pixel range `[lo, hi)` covering `min..max` on an axis of `len` pixels.
    fn span(min: f64, max: f64, len: u32) -> Option<(u32, u32)> {
        let lo = min.floor().max(0.0);
        let hi = max.ceil().min(len as f64);
        (lo < hi).then(|| (lo as u32, hi as u32))
    }

    fn stroke_segment(&mut self, a: DVec2, b: DVec2, width: f64, color: [f32; 4]) {
        if !(a.is_finite() && b.is_finite() && width.is_finite()) || width <= 0.0 {
            return;
        }
        let half = width.max(1.0) / 2.0;
        let intensity = width.min(1.0) as f32;
        let pad = half + 1.0;

        let Some((x0, x1)) = Self::span(a.x.min(b.x) - pad, a.x.max(b.x) + pad, self.image.width()) else {
            return;
        };
        let Some((y0, y1)) = Self::span(a.y.min(b.y) - pad, a.y.max(b.y) + pad, self.image.height()) else {
            return;
        };

        let ab = b - a;
        let len_sq = ab.length_squared();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dist = p.distance(a + ab * t);
                let coverage = (half + 0.5 - dist).clamp(0.0, 1.0) as f32;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage * intensity);
                }
            }
        }
    }
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::from_pixel(width, height, Pixel([0, 0, 0, 255]));
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return;
        }
        let Some((x0, x1)) = Self::span(x, x + width, self.image.width()) else {
            return;
        };
        let Some((y0, y1)) = Self::span(y, y + height, self.image.height()) else {
            return;
        };
        let color = color.to_f32();
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if !(center.is_finite() && radius.is_finite()) || radius <= 0.0 {
            return;
        }
        let Some((x0, x1)) = Self::span(center.x - radius - 1.0, center.x + radius + 1.0, self.image.width()) else {
            return;
        };
        let Some((y0, y1)) = Self::span(center.y - radius - 1.0, center.y + radius + 1.0, self.image.height()) else {
            return;
        };

        // sub-pixel circles fade instead of vanishing
        let intensity = (radius * 2.0).min(1.0) as f32;
        let r = radius.max(0.5);
        let color = color.to_f32();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (r + 0.5 - p.distance(center)).clamp(0.0, 1.0) as f32;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage * intensity);
                }
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f64, color: Rgba) {
        let color = color.to_f32();
        for &(a, b) in path.segments() {
            self.stroke_segment(a, b, width, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_fill_replaces_pixels() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.fill(Rgba::opaque(17, 17, 17));
        assert_eq!(canvas.pixel(0, 0), [17, 17, 17, 255]);
        assert_eq!(canvas.pixel(3, 3), [17, 17, 17, 255]);
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.fill(Rgba::opaque(200, 0, 0));
        canvas.fill(Rgba::new(0, 0, 0, 0.5));
        assert_eq!(canvas.pixel(1, 1), [100, 0, 0, 255]);
    }

    #[test]
    fn test_lighter_adds_and_saturates() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.fill(Rgba::opaque(100, 200, 0));
        canvas.set_composite(CompositeMode::Lighter);
        canvas.fill(Rgba::opaque(100, 100, 50));
        assert_eq!(canvas.pixel(0, 0), [200, 255, 50, 255]);
    }

    #[test]
    fn test_circle_covers_center_not_corner() {
        let mut canvas = PixelCanvas::new(20, 20);
        canvas.fill(Rgba::BLACK);
        canvas.fill_circle(DVec2::new(10.0, 10.0), 4.0, Rgba::opaque(255, 255, 255));
        assert_eq!(canvas.pixel(10, 10), [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_line_is_drawn_along_its_length() {
        let mut canvas = PixelCanvas::new(20, 5);
        canvas.fill(Rgba::BLACK);
        canvas.stroke_line(DVec2::new(2.0, 2.5), DVec2::new(18.0, 2.5), 1.0, Rgba::opaque(0, 255, 0));
        assert_eq!(canvas.pixel(10, 2)[1], 255);
        assert_eq!(canvas.pixel(10, 0)[1], 0);
    }

    #[test]
    fn test_hairline_is_faint() {
        let mut canvas = PixelCanvas::new(20, 5);
        canvas.fill(Rgba::BLACK);
        canvas.stroke_line(DVec2::new(2.0, 2.5), DVec2::new(18.0, 2.5), 0.1, Rgba::opaque(0, 0, 255));
        let blue = canvas.pixel(10, 2)[2];
        assert!(blue > 0 && blue < 64);
    }

    #[test]
    fn test_non_finite_geometry_is_skipped() {
        let mut canvas = PixelCanvas::new(8, 8);
        canvas.fill(Rgba::BLACK);
        canvas.fill_circle(DVec2::new(f64::INFINITY, 4.0), 2.0, Rgba::opaque(255, 0, 0));
        canvas.stroke_line(DVec2::new(f64::NAN, 0.0), DVec2::new(4.0, 4.0), 1.0, Rgba::opaque(255, 0, 0));
        assert!(canvas.image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let mut canvas = PixelCanvas::new(8, 8);
        canvas.fill(Rgba::BLACK);
        canvas.fill_circle(DVec2::new(-50.0, -50.0), 3.0, Rgba::opaque(255, 0, 0));
        canvas.fill_rect(100.0, 100.0, 5.0, 5.0, Rgba::opaque(255, 0, 0));
        assert!(canvas.image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_recording_canvas_keeps_order() {
        let mut canvas = RecordingCanvas::new(10, 10);
        canvas.set_composite(CompositeMode::Lighter);
        canvas.fill(Rgba::BLACK);
        let commands = canvas.take();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], DrawCommand::Composite(CompositeMode::Lighter));
        assert!(matches!(commands[1], DrawCommand::FillRect { width, height, .. } if width == 10.0 && height == 10.0));
        assert!(canvas.commands().is_empty());
    }
}
