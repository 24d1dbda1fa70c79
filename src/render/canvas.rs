use std::sync::Arc;

use crate::foundation::core::{Point, Rect, Rgba8Premul, SurfaceSize};
use crate::foundation::error::{TacticalError, TacticalResult};

/// A full-surface pixel readout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Decoded image used as a repeating fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Texture {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> TacticalResult<Self> {
        if width == 0 || height == 0 {
            return Err(TacticalError::validation("texture must not be empty"));
        }
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(TacticalError::validation("texture byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Premultiplied texel at `(x mod width, y mod height)`.
    pub fn texel_wrapped(&self, x: i64, y: i64) -> [u8; 4] {
        let tx = x.rem_euclid(i64::from(self.width)) as usize;
        let ty = y.rem_euclid(i64::from(self.height)) as usize;
        let i = (ty * self.width as usize + tx) * 4;
        let d = &self.rgba8_premul;
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: Rgba8Premul,
}

/// Pixel drawing primitives of a 2D surface.
///
/// Coordinates are surface pixels with the origin at the top-left corner. Drawing
/// composites source-over onto what is already there.
pub trait Canvas2D {
    fn size(&self) -> SurfaceSize;

    /// Reset every pixel to transparent.
    fn clear(&mut self) -> TacticalResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Rgba8Premul) -> TacticalResult<()>;

    /// Fill `rect` with `texture` repeated in both directions, anchored at the rect origin.
    fn fill_pattern(&mut self, rect: Rect, texture: &Texture) -> TacticalResult<()>;

    fn stroke_rect(&mut self, rect: Rect, stroke: StrokeStyle) -> TacticalResult<()>;

    fn stroke_line(&mut self, from: Point, to: Point, stroke: StrokeStyle) -> TacticalResult<()>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8Premul)
    -> TacticalResult<()>;

    /// Read back the fully drawn surface.
    fn snapshot(&mut self) -> TacticalResult<FrameRGBA>;

    /// Replace the surface contents with `frame` in one copy.
    fn blit(&mut self, frame: &FrameRGBA) -> TacticalResult<()>;
}
