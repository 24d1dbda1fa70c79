use crate::foundation::core::{Rect, SurfaceSize};
use crate::foundation::error::{TacticalError, TacticalResult};
use crate::render::canvas::Texture;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over for one pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = 255 - u16::from(sa);
            let mut out = [0u8; 4];
            for (o, (&d, &s)) in out.iter_mut().zip(dst.iter().zip(src.iter())) {
                *o = s.saturating_add(mul_div255(u16::from(d), inv));
            }
            out
        }
    }
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> TacticalResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TacticalError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite a repeating `texture` over the pixels of `dst` covered by `rect`.
///
/// Pixel `(x, y)` samples texel `(x - rect.x0, y - rect.y0)` wrapped to the texture size.
/// The rect is snapped outward to whole pixels and clipped to the surface.
pub fn pattern_over_in_place(
    dst: &mut [u8],
    size: SurfaceSize,
    rect: Rect,
    texture: &Texture,
) -> TacticalResult<()> {
    if dst.len() != size.byte_len() {
        return Err(TacticalError::render(
            "pattern_over_in_place surface byte length mismatch",
        ));
    }
    let r = rect.expand().intersect(size.bounds());
    if r.width() <= 0.0 || r.height() <= 0.0 {
        return Ok(());
    }

    let (x0, y0) = (r.x0 as i64, r.y0 as i64);
    let (x1, y1) = (r.x1 as i64, r.y1 as i64);
    let (ox, oy) = (rect.x0.floor() as i64, rect.y0.floor() as i64);
    let stride = size.width as usize * 4;

    for y in y0..y1 {
        let row = y as usize * stride;
        for x in x0..x1 {
            let i = row + x as usize * 4;
            let texel = texture.texel_wrapped(x - ox, y - oy);
            let out = over([dst[i], dst[i + 1], dst[i + 2], dst[i + 3]], texel);
            dst[i..i + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of [`premultiply_rgba8_in_place`], for encoders that expect straight alpha.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
