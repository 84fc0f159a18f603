//! Drawing surfaces with canvas-style transform state.

use tiny_skia::{BlendMode, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::{DecodedBitmap, RenderError, RenderResult};

/// A mutable 2D drawing target with a save/restore transform stack.
///
/// `translate` and `scale` compose onto the current transform the way a
/// browser canvas does: the most recent call applies to points first.
pub trait DrawingSurface {
    /// Push the current transform.
    fn save(&mut self);

    /// Pop the last saved transform. Unbalanced calls are ignored.
    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);

    fn scale(&mut self, sx: f32, sy: f32);

    /// Draw the bitmap at native size with its top-left at `(x, y)` in the
    /// current transformed space.
    fn draw_bitmap(&mut self, bitmap: &DecodedBitmap, x: f32, y: f32);
}

/// Run `f` between `save` and `restore` so transform changes made inside do
/// not leak into later draws.
pub fn with_saved_state<S, R>(surface: &mut S, f: impl FnOnce(&mut S) -> R) -> R
where
    S: DrawingSurface + ?Sized,
{
    surface.save();
    let result = f(surface);
    surface.restore();
    result
}

/// Off-screen surface backed by a tiny-skia pixmap.
///
/// Bitmaps are resampled with bilinear filtering when the transform
/// stretches them.
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
    stack: Vec<Transform>,
    opacity: f32,
}

impl PixmapSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSurfaceSize { width, height })?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            stack: Vec::new(),
            opacity: 1.0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Depth of the save stack.
    pub fn saved_states(&self) -> usize {
        self.stack.len()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Opacity applied to every subsequent bitmap draw.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some((c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Copy of the surface as straight-alpha RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

impl DrawingSurface for PixmapSurface {
    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pre_translate(dx, dy);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform.pre_scale(sx, sy);
    }

    fn draw_bitmap(&mut self, bitmap: &DecodedBitmap, x: f32, y: f32) {
        let paint = PixmapPaint {
            opacity: self.opacity,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            bitmap.as_pixmap_ref(),
            &paint,
            self.transform.pre_translate(x, y),
            None,
        );
    }
}
