use kurbo::Shape;

use crate::foundation::core::{BezPath, Point, Rect, Rgba8Premul, SurfaceSize};
use crate::foundation::error::{TacticalError, TacticalResult};
use crate::render::canvas::{Canvas2D, FrameRGBA, StrokeStyle, Texture};
use crate::render::composite::{over_in_place, pattern_over_in_place};

const PATH_TOLERANCE: f64 = 0.1;

/// Software raster surface backed by a `vello_cpu` pixmap.
///
/// Vector primitives are batched into a render context and resolved into the pixmap
/// before any direct pixel access (pattern fills, snapshots, blits).
pub struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
    pending_ops: usize,
}

impl CpuSurface {
    pub fn new(size: SurfaceSize) -> TacticalResult<Self> {
        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| TacticalError::render("surface width exceeds u16"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| TacticalError::render("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            ctx: vello_cpu::RenderContext::new(width, height),
            pending_ops: 0,
        })
    }

    fn fill_cpu_path(&mut self, path: &BezPath, color: Rgba8Premul) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(premul_to_cpu_color(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
        self.pending_ops += 1;
    }

    fn fill_stroke(&mut self, path: &BezPath, stroke: StrokeStyle) {
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &kurbo::Stroke::new(stroke.width),
            &kurbo::StrokeOpts::default(),
            PATH_TOLERANCE,
        );
        self.fill_cpu_path(&outline, stroke.color);
    }

    /// Resolve batched vector ops into the pixmap.
    fn flush(&mut self) -> TacticalResult<()> {
        if self.pending_ops == 0 {
            return Ok(());
        }
        let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut layer);
        over_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
        )?;
        self.reset_ctx();
        Ok(())
    }

    fn reset_ctx(&mut self) {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        self.pending_ops = 0;
    }
}

impl Canvas2D for CpuSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(u32::from(self.width), u32::from(self.height))
    }

    fn clear(&mut self) -> TacticalResult<()> {
        self.reset_ctx();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8Premul) -> TacticalResult<()> {
        self.fill_cpu_path(&rect.to_path(PATH_TOLERANCE), color);
        Ok(())
    }

    fn fill_pattern(&mut self, rect: Rect, texture: &Texture) -> TacticalResult<()> {
        self.flush()?;
        let size = self.size();
        pattern_over_in_place(self.pixmap.data_as_u8_slice_mut(), size, rect, texture)
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: StrokeStyle) -> TacticalResult<()> {
        self.fill_stroke(&rect.to_path(PATH_TOLERANCE), stroke);
        Ok(())
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: StrokeStyle) -> TacticalResult<()> {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.fill_stroke(&path, stroke);
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        color: Rgba8Premul,
    ) -> TacticalResult<()> {
        if radius <= 0.0 {
            return Ok(());
        }
        let circle = kurbo::Circle::new(center, radius);
        self.fill_cpu_path(&circle.to_path(PATH_TOLERANCE), color);
        Ok(())
    }

    fn snapshot(&mut self) -> TacticalResult<FrameRGBA> {
        self.flush()?;
        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn blit(&mut self, frame: &FrameRGBA) -> TacticalResult<()> {
        if frame.size() != self.size() {
            return Err(TacticalError::render(format!(
                "blit size mismatch: frame {}x{}, surface {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        self.reset_ctx();
        self.pixmap.data_as_u8_slice_mut().copy_from_slice(&frame.data);
        Ok(())
    }
}

fn premul_to_cpu_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    // peniko colors are straight alpha.
    let unpremul = |v: u8| -> u8 {
        if c.a == 0 {
            0
        } else {
            ((u16::from(v) * 255 + u16::from(c.a) / 2) / u16::from(c.a)).min(255) as u8
        }
    };
    vello_cpu::peniko::Color::from_rgba8(unpremul(c.r), unpremul(c.g), unpremul(c.b), c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
