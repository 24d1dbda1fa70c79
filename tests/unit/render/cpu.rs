use super::*;

fn surface(w: u32, h: u32) -> CpuSurface {
    CpuSurface::new(SurfaceSize::new(w, h)).unwrap()
}

#[test]
fn new_surface_is_transparent() {
    let mut s = surface(8, 6);
    let frame = s.snapshot().unwrap();
    assert_eq!(frame.size(), SurfaceSize::new(8, 6));
    assert!(frame.premultiplied);
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn oversized_surface_is_rejected() {
    assert!(CpuSurface::new(SurfaceSize::new(70_000, 4)).is_err());
}

#[test]
fn filled_circle_covers_its_centre() {
    let mut s = surface(32, 32);
    s.fill_circle(Point::new(16.0, 16.0), 5.0, Rgba8Premul::YELLOW)
        .unwrap();
    let frame = s.snapshot().unwrap();
    assert_eq!(frame.pixel(16, 16), Some([255, 255, 0, 255]));
    assert_eq!(frame.pixel(2, 2), Some([0, 0, 0, 0]));
}

#[test]
fn vector_ops_composite_over_pattern() {
    let tex = Texture::new(1, 1, vec![0, 128, 0, 255]).unwrap();
    let mut s = surface(16, 16);
    s.fill_pattern(s.size().bounds(), &tex).unwrap();
    s.fill_circle(Point::new(8.0, 8.0), 4.0, Rgba8Premul::BLACK)
        .unwrap();
    let frame = s.snapshot().unwrap();
    assert_eq!(frame.pixel(8, 8), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(0, 15), Some([0, 128, 0, 255]));
}

#[test]
fn stroked_line_marks_pixels_along_it() {
    let mut s = surface(20, 20);
    let stroke = StrokeStyle {
        width: 5.0,
        color: Rgba8Premul::WHITE,
    };
    s.stroke_line(Point::new(0.0, 10.0), Point::new(20.0, 10.0), stroke)
        .unwrap();
    let frame = s.snapshot().unwrap();
    assert_eq!(frame.pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(10, 2), Some([0, 0, 0, 0]));
}

#[test]
fn clear_discards_pending_and_drawn_content() {
    let mut s = surface(10, 10);
    s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgba8Premul::WHITE)
        .unwrap();
    let _ = s.snapshot().unwrap();
    s.fill_circle(Point::new(5.0, 5.0), 3.0, Rgba8Premul::BLACK)
        .unwrap();
    s.clear().unwrap();
    assert!(s.snapshot().unwrap().data.iter().all(|&b| b == 0));
}

#[test]
fn blit_replaces_contents_and_checks_size() {
    let mut src = surface(6, 4);
    src.fill_rect(Rect::new(0.0, 0.0, 6.0, 4.0), Rgba8Premul::YELLOW)
        .unwrap();
    let frame = src.snapshot().unwrap();

    let mut dst = surface(6, 4);
    dst.blit(&frame).unwrap();
    assert_eq!(dst.snapshot().unwrap(), frame);

    let mut wrong = surface(5, 4);
    assert!(wrong.blit(&frame).is_err());
}
