//! Tactical board overlay for analysed sports video.
//!
//! A video is uploaded to an analysis backend which tracks players and maps them onto a
//! normalized pitch. This crate drives that job and renders its result:
//!
//! - Submit a clip and poll it to completion with an [`AnalysisJob`]
//! - Hand the resulting [`CoordinateDataset`] to an [`OverlayCompositor`]
//! - Let the compositor follow a [`VideoElement`], compositing the pitch and player
//!   markers for every displayed frame into a double-buffered surface
#![forbid(unsafe_code)]

mod foundation;

pub mod job;
pub mod overlay;
pub mod pitch;
pub mod render;
pub mod track;

pub use crate::foundation::config::TacticalConfig;
pub use crate::foundation::core::{
    Affine, BezPath, Fps, FrameIndex, Point, Rect, Rgba8Premul, SurfaceSize, Vec2,
};
pub use crate::foundation::error::{TacticalError, TacticalResult};

pub use crate::job::client::{AnalysisBackend, HttpBackend, JobHandle, VideoUpload};
pub use crate::job::machine::{AnalysisJob, JobPhase, JobReport, Sleeper, TokioSleeper};
pub use crate::job::wire::{PollOutcome, PollResponse, Progress};
pub use crate::overlay::compositor::{
    DatasetPublisher, EntityStyle, OverlayCompositor, OverlaySink, RunSummary, SharedDataset,
    StopReason, TickReport,
};
pub use crate::overlay::video::{FrameMetadata, ScriptedPlayback, SimulatedPlayback, VideoElement};
pub use crate::pitch::geometry::{PitchGeometry, PixelPos};
pub use crate::pitch::render::{PitchRenderer, PitchStyle};
pub use crate::pitch::texture::{TextureSlot, decode_texture};
pub use crate::render::canvas::{Canvas2D, FrameRGBA, StrokeStyle, Texture};
pub use crate::render::cpu::CpuSurface;
pub use crate::track::model::{CoordinateDataset, FrameBounds, TrackedEntity};
pub use crate::track::resolve::{resolve_frame_index, resolve_frame_index_for_len};
