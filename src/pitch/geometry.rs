use crate::foundation::core::{Point, Rect, SurfaceSize};
use crate::track::model::{PITCH_UNITS_X, PITCH_UNITS_Y};

/// Width / height ratio of the drawn pitch.
pub const PITCH_ASPECT: f64 = 0.37;
/// Minimum gap above and below the pitch, in pixels.
pub const VERTICAL_MARGIN_PX: f64 = 10.0;

/// Placement of the pitch rectangle on a surface of a given size.
///
/// Derived from the surface dimensions only; recompute whenever the surface resizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchGeometry {
    pub vertical_offset: f64,
    pub horizontal_offset: f64,
    pub pitch_height: f64,
    pub pitch_width: f64,
}

/// Pixel position of a mapped entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelPos {
    pub x: i64,
    pub y: i64,
}

impl PixelPos {
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }
}

impl PitchGeometry {
    /// Inscribe the pitch into `surface`: fit the height minus the vertical margins and
    /// centre horizontally. A surface too narrow for that is fitted by width and centred
    /// vertically instead.
    pub fn for_surface(surface: SurfaceSize) -> Self {
        let w = f64::from(surface.width);
        let h = f64::from(surface.height);

        let mut pitch_height = (h - 2.0 * VERTICAL_MARGIN_PX).max(0.0);
        let mut pitch_width = pitch_height * PITCH_ASPECT;
        if pitch_width > w {
            pitch_width = w;
            pitch_height = w / PITCH_ASPECT;
        }

        Self {
            vertical_offset: (h - pitch_height) / 2.0,
            horizontal_offset: (w - pitch_width) / 2.0,
            pitch_height,
            pitch_width,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.horizontal_offset,
            self.vertical_offset,
            self.horizontal_offset + self.pitch_width,
            self.vertical_offset + self.pitch_height,
        )
    }

    /// Unrounded pixel position of a point given as a fraction of pitch width/height.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point {
        Point::new(
            self.horizontal_offset + self.pitch_width * fx,
            self.vertical_offset + self.pitch_height * fy,
        )
    }

    /// Map normalized pitch coordinates to the nearest pixel.
    pub fn to_pixel(&self, x: f64, y: f64) -> PixelPos {
        PixelPos {
            x: (x * self.pitch_width / PITCH_UNITS_X + self.horizontal_offset).round() as i64,
            y: (y * self.pitch_height / PITCH_UNITS_Y + self.vertical_offset).round() as i64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pitch/geometry.rs"]
mod tests;
