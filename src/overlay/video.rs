use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::core::Fps;

/// Per-displayed-frame notification payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetadata {
    /// Host clock timestamp of the presentation, in milliseconds.
    pub now_ms: f64,
    /// Playback position of the displayed frame, in seconds. Source of truth for overlays.
    pub media_time: f64,
    pub presented_frames: u64,
}

/// Playback capability of the video the overlay follows.
#[async_trait]
pub trait VideoElement: Send {
    fn play(&mut self);

    fn pause(&mut self);

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Wait for the next displayed frame. `None` once playback is paused or has ended.
    async fn next_frame(&mut self) -> Option<FrameMetadata>;
}

/// A clock-driven stand-in for a playing video.
///
/// Emits one frame every `1 / fps` seconds of media time until `duration` is reached.
/// With `pace` set it also sleeps in real time between frames.
#[derive(Clone, Debug)]
pub struct SimulatedPlayback {
    fps: Fps,
    duration_s: f64,
    pace: bool,
    playing: bool,
    frame: u64,
    presented: u64,
}

impl SimulatedPlayback {
    pub fn new(fps: Fps, duration_s: f64) -> Self {
        Self {
            fps,
            duration_s: duration_s.max(0.0),
            pace: false,
            playing: false,
            frame: 0,
            presented: 0,
        }
    }

    pub fn paced(mut self) -> Self {
        self.pace = true;
        self
    }

    pub fn seek(&mut self, media_time: f64) {
        self.frame = self.fps.secs_to_frames_floor(media_time.clamp(0.0, self.duration_s));
    }

    pub fn is_ended(&self) -> bool {
        self.fps.frames_to_secs(self.frame) >= self.duration_s
    }
}

#[async_trait]
impl VideoElement for SimulatedPlayback {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.fps.frames_to_secs(self.frame).min(self.duration_s)
    }

    async fn next_frame(&mut self) -> Option<FrameMetadata> {
        if !self.playing || self.is_ended() {
            self.playing = false;
            return None;
        }
        if self.pace {
            tokio::time::sleep(Duration::from_secs_f64(self.fps.frame_duration_secs())).await;
        }
        let media_time = self.current_time();
        self.frame += 1;
        self.presented += 1;
        Some(FrameMetadata {
            now_ms: media_time * 1000.0,
            media_time,
            presented_frames: self.presented,
        })
    }
}

/// Replays a fixed list of media times, one per frame notification.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPlayback {
    times: VecDeque<f64>,
    current: f64,
    presented: u64,
    playing: bool,
}

impl ScriptedPlayback {
    pub fn new(times: impl IntoIterator<Item = f64>) -> Self {
        Self {
            times: times.into_iter().collect(),
            current: 0.0,
            presented: 0,
            playing: true,
        }
    }

    pub fn remaining(&self) -> usize {
        self.times.len()
    }
}

#[async_trait]
impl VideoElement for ScriptedPlayback {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.current
    }

    async fn next_frame(&mut self) -> Option<FrameMetadata> {
        if !self.playing {
            return None;
        }
        let media_time = self.times.pop_front()?;
        self.current = media_time;
        self.presented += 1;
        Some(FrameMetadata {
            now_ms: self.presented as f64 * 16.0,
            media_time,
            presented_frames: self.presented,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/video.rs"]
mod tests;
