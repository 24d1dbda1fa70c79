use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn zero_time_returns_first_populated_frame() {
    let zero_based = FrameBounds::from_len(10).unwrap();
    assert_eq!(resolve_frame_index(0.0, zero_based, fps30()), FrameIndex(0));

    let one_based = FrameBounds {
        first: FrameIndex(1),
        last: FrameIndex(10),
    };
    assert_eq!(resolve_frame_index(0.0, one_based, fps30()), FrameIndex(1));
    assert_eq!(resolve_frame_index(-1.0, one_based, fps30()), FrameIndex(1));
}

#[test]
fn overrun_clamps_to_last_frame() {
    for n in [1u64, 2, 10, 300] {
        let last = FrameIndex(n - 1);
        let at_end = (n as f64) / 30.0;
        assert_eq!(resolve_frame_index_for_len(at_end, n, fps30()), Some(last));
        assert_eq!(resolve_frame_index_for_len(at_end + 5.0, n, fps30()), Some(last));
    }
}

#[test]
fn interior_times_floor_to_frame() {
    assert_eq!(
        resolve_frame_index_for_len(0.1, 10, fps30()),
        Some(FrameIndex(3))
    );
    assert_eq!(
        resolve_frame_index_for_len(0.2, 10, fps30()),
        Some(FrameIndex(6))
    );
}

#[test]
fn empty_dataset_has_no_index() {
    assert_eq!(resolve_frame_index_for_len(1.0, 0, fps30()), None);
}

#[test]
fn monotonic_in_time() {
    let bounds = FrameBounds {
        first: FrameIndex(1),
        last: FrameIndex(42),
    };
    let mut prev = FrameIndex(0);
    for step in 0..=200 {
        let t = f64::from(step) * 0.0125 - 0.1;
        let idx = resolve_frame_index(t, bounds, fps30());
        assert!(idx >= prev, "t={t} idx={idx:?} prev={prev:?}");
        assert!(idx >= bounds.first && idx <= bounds.last);
        prev = idx;
    }
}
