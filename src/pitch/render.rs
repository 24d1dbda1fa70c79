use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::TacticalResult;
use crate::pitch::geometry::PitchGeometry;
use crate::pitch::texture::TextureSlot;
use crate::render::canvas::{Canvas2D, StrokeStyle};

/// Endzone lines, as a fraction of pitch height from the top (mirrored at the bottom).
pub const ENDZONE_FRACTION: f64 = 0.18;
/// Break-mark circles, as a fraction of pitch height from the top (mirrored at the bottom).
pub const BREAK_MARK_FRACTION: f64 = 0.32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchStyle {
    pub line: StrokeStyle,
    pub mark_radius: f64,
    pub mark_color: Rgba8Premul,
    /// Drawn under the markings when no texture is available.
    pub fallback_fill: Option<Rgba8Premul>,
}

impl Default for PitchStyle {
    fn default() -> Self {
        Self {
            line: StrokeStyle {
                width: 5.0,
                color: Rgba8Premul::WHITE,
            },
            mark_radius: 3.0,
            mark_color: Rgba8Premul::WHITE,
            fallback_fill: None,
        }
    }
}

/// Draws the static board: textured background, outline, endzone lines and break marks.
#[derive(Debug, Default)]
pub struct PitchRenderer {
    texture: TextureSlot,
    style: PitchStyle,
}

impl PitchRenderer {
    pub fn new(texture: TextureSlot, style: PitchStyle) -> Self {
        Self { texture, style }
    }

    pub fn style(&self) -> &PitchStyle {
        &self.style
    }

    /// Block until an in-flight texture load settles. Only the first call can wait.
    pub async fn wait_for_texture(&mut self) -> bool {
        self.texture.settle().await.is_some()
    }

    /// Draw the pitch onto `canvas`, sized from the canvas itself.
    ///
    /// Never waits for the texture: while it is loading, or if it failed to load, the
    /// outline and markings are drawn on their own.
    pub fn render<C: Canvas2D + ?Sized>(&mut self, canvas: &mut C) -> TacticalResult<PitchGeometry> {
        let size = canvas.size();
        let geom = PitchGeometry::for_surface(size);

        match self.texture.poll() {
            Some(texture) => canvas.fill_pattern(size.bounds(), &texture)?,
            None => {
                if let Some(fill) = self.style.fallback_fill {
                    canvas.fill_rect(size.bounds(), fill)?;
                }
            }
        }

        let line = self.style.line;
        canvas.stroke_rect(geom.rect(), line)?;

        for fy in [ENDZONE_FRACTION, 1.0 - ENDZONE_FRACTION] {
            canvas.stroke_line(geom.at_fraction(0.0, fy), geom.at_fraction(1.0, fy), line)?;
        }

        for fy in [BREAK_MARK_FRACTION, 1.0 - BREAK_MARK_FRACTION] {
            canvas.fill_circle(
                geom.at_fraction(0.5, fy),
                self.style.mark_radius,
                self.style.mark_color,
            )?;
        }

        Ok(geom)
    }

}

#[cfg(test)]
#[path = "../../tests/unit/pitch/render.rs"]
mod tests;
