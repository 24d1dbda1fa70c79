use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn secs_to_frames_saturates_below_zero() {
    let fps = Fps::default();
    assert_eq!(fps.secs_to_frames_floor(-0.5), 0);
    assert_eq!(fps.secs_to_frames_floor(f64::NAN), 0);
    assert_eq!(fps.secs_to_frames_floor(0.1), 3);
}

#[test]
fn surface_size_bounds_and_bytes() {
    let s = SurfaceSize::new(4, 3);
    assert_eq!(s.byte_len(), 48);
    assert_eq!(s.bounds(), Rect::new(0.0, 0.0, 4.0, 3.0));
    assert!(!s.is_empty());
    assert!(SurfaceSize::new(0, 3).is_empty());
}

#[test]
fn named_colors_are_opaque() {
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
    assert_eq!(Rgba8Premul::YELLOW.to_array(), [255, 255, 0, 255]);
}
