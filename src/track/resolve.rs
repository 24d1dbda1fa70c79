use crate::foundation::core::{Fps, FrameIndex};
use crate::track::model::FrameBounds;

/// Map a playback time to the analysed frame to display.
///
/// `raw = floor(media_time_s * fps)`, clamped into `bounds`. Playback time is sampled
/// asynchronously to frame scheduling, so it can overrun the last analysed frame or land
/// before the first populated one; both ends snap to the nearest frame with data.
pub fn resolve_frame_index(media_time_s: f64, bounds: FrameBounds, fps: Fps) -> FrameIndex {
    let raw = fps.secs_to_frames_floor(media_time_s);
    if raw >= bounds.last.0 {
        return bounds.last;
    }
    if raw <= bounds.first.0 {
        return bounds.first;
    }
    FrameIndex(raw)
}

/// Length-based form for a 0-based dataset of `len` frames. `None` when `len == 0`.
pub fn resolve_frame_index_for_len(media_time_s: f64, len: u64, fps: Fps) -> Option<FrameIndex> {
    FrameBounds::from_len(len).map(|b| resolve_frame_index(media_time_s, b, fps))
}

#[cfg(test)]
#[path = "../../tests/unit/track/resolve.rs"]
mod tests;
