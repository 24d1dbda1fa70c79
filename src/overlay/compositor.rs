use std::sync::Arc;

use tokio::sync::watch;

use crate::foundation::core::{Fps, FrameIndex, Rgba8Premul, SurfaceSize};
use crate::foundation::error::TacticalResult;
use crate::overlay::video::VideoElement;
use crate::pitch::render::PitchRenderer;
use crate::render::canvas::Canvas2D;
use crate::render::cpu::CpuSurface;
use crate::track::model::{CoordinateDataset, TrackedEntity};
use crate::track::resolve::resolve_frame_index;

pub type SharedDataset = Arc<CoordinateDataset>;

/// Receives the dataset of a successful analysis job.
pub trait OverlaySink {
    fn activate(&self, dataset: SharedDataset);
}

/// Cloneable handle that installs datasets into an [`OverlayCompositor`].
///
/// Swaps take effect at the compositor's next tick boundary, never mid-frame.
#[derive(Clone, Debug)]
pub struct DatasetPublisher {
    tx: Arc<watch::Sender<Option<SharedDataset>>>,
}

impl DatasetPublisher {
    fn channel() -> (Self, watch::Receiver<Option<SharedDataset>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Publish `dataset`. Returns `false` when the same dataset is already active.
    pub fn publish(&self, dataset: SharedDataset) -> bool {
        self.tx.send_if_modified(|current| match current {
            Some(active) if Arc::ptr_eq(active, &dataset) || **active == *dataset => false,
            _ => {
                *current = Some(dataset);
                true
            }
        })
    }

    /// Deactivate; a running render loop stops at its next boundary.
    pub fn clear(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }
}

impl OverlaySink for DatasetPublisher {
    fn activate(&self, dataset: SharedDataset) {
        if !self.publish(dataset) {
            tracing::debug!("dataset already active; activation ignored");
        }
    }
}

/// How tracked entities are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityStyle {
    /// Only entities of this class are drawn.
    pub player_class_id: u32,
    pub radius: f64,
    pub team0: Rgba8Premul,
    pub team1: Rgba8Premul,
}

impl Default for EntityStyle {
    fn default() -> Self {
        Self {
            player_class_id: 0,
            radius: 5.0,
            team0: Rgba8Premul::BLACK,
            team1: Rgba8Premul::YELLOW,
        }
    }
}

impl EntityStyle {
    pub fn color_for(&self, entity: &TrackedEntity) -> Rgba8Premul {
        if entity.team == 0 { self.team0 } else { self.team1 }
    }
}

/// Outcome of one composited frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Analysed frame shown, `None` without an active (non-empty) dataset.
    pub frame: Option<FrameIndex>,
    pub entities_drawn: usize,
    /// The resolved frame had no entry in the dataset; only the pitch was drawn.
    pub data_gap: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    NoDataset,
    PlaybackStopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub failed_ticks: u64,
    pub data_gaps: u64,
    pub last_frame: Option<FrameIndex>,
    pub stop: StopReason,
}

type BackBufferFactory<B> = Box<dyn Fn(SurfaceSize) -> TacticalResult<B> + Send>;

/// Render session of the tactical board.
///
/// Owns the visible surface, an equally sized back buffer, the pitch renderer and the
/// active dataset. Every tick is drawn completely into the back buffer and presented with
/// a single blit, so the visible surface only ever shows finished frames.
pub struct OverlayCompositor<V: Canvas2D, B: Canvas2D = CpuSurface> {
    visible: V,
    back: B,
    make_back: BackBufferFactory<B>,
    pitch: PitchRenderer,
    fps: Fps,
    style: EntityStyle,
    dataset: Option<SharedDataset>,
    activation: watch::Receiver<Option<SharedDataset>>,
    publisher: DatasetPublisher,
}

impl<V: Canvas2D> OverlayCompositor<V, CpuSurface> {
    pub fn new(visible: V, pitch: PitchRenderer, fps: Fps) -> TacticalResult<Self> {
        Self::with_back_buffer(visible, pitch, fps, CpuSurface::new)
    }
}

impl<V: Canvas2D, B: Canvas2D> OverlayCompositor<V, B> {
    pub fn with_back_buffer(
        visible: V,
        pitch: PitchRenderer,
        fps: Fps,
        make_back: impl Fn(SurfaceSize) -> TacticalResult<B> + Send + 'static,
    ) -> TacticalResult<Self> {
        let back = make_back(visible.size())?;
        let (publisher, activation) = DatasetPublisher::channel();
        Ok(Self {
            visible,
            back,
            make_back: Box::new(make_back),
            pitch,
            fps,
            style: EntityStyle::default(),
            dataset: None,
            activation,
            publisher,
        })
    }

    pub fn with_entity_style(mut self, style: EntityStyle) -> Self {
        self.style = style;
        self
    }

    /// Handle for installing datasets from elsewhere (e.g. the job state machine).
    pub fn publisher(&self) -> DatasetPublisher {
        self.publisher.clone()
    }

    /// Install `dataset`; it becomes active at the next tick boundary.
    pub fn activate(&self, dataset: SharedDataset) {
        self.publisher.activate(dataset);
    }

    pub fn active_dataset(&self) -> Option<&SharedDataset> {
        self.dataset.as_ref()
    }

    pub fn visible(&self) -> &V {
        &self.visible
    }

    pub fn visible_mut(&mut self) -> &mut V {
        &mut self.visible
    }

    pub fn back_buffer(&self) -> &B {
        &self.back
    }

    pub fn pitch_mut(&mut self) -> &mut PitchRenderer {
        &mut self.pitch
    }

    /// Swap in a resized visible surface; the back buffer follows on the next tick.
    pub fn replace_visible(&mut self, visible: V) -> V {
        std::mem::replace(&mut self.visible, visible)
    }

    /// Wait until a dataset is published, then make it active.
    pub async fn wait_for_activation(&mut self) -> SharedDataset {
        loop {
            let current = self.activation.borrow_and_update().clone();
            if let Some(ds) = current {
                self.dataset = Some(Arc::clone(&ds));
                return ds;
            }
            // The compositor owns a publisher, so the channel cannot close under us.
            let _ = self.activation.changed().await;
        }
    }

    fn sync_activation(&mut self) {
        if self.activation.has_changed().unwrap_or(false) {
            let next = self.activation.borrow_and_update().clone();
            tracing::info!(
                frames = next.as_ref().map(|d| d.len()),
                "overlay dataset swapped"
            );
            self.dataset = next;
        }
    }

    fn ensure_back_buffer(&mut self) -> TacticalResult<()> {
        let size = self.visible.size();
        if self.back.size() != size {
            tracing::debug!(width = size.width, height = size.height, "recreating back buffer");
            self.back = (self.make_back)(size)?;
        }
        Ok(())
    }

    /// Composite and present the board for playback position `media_time` (seconds).
    pub fn tick(&mut self, media_time: f64) -> TacticalResult<TickReport> {
        self.sync_activation();
        self.ensure_back_buffer()?;

        self.back.clear()?;
        let geom = self.pitch.render(&mut self.back)?;

        let mut report = TickReport::default();
        if let Some(ds) = self.dataset.as_deref()
            && let Some(bounds) = ds.bounds()
        {
            let index = resolve_frame_index(media_time, bounds, self.fps);
            report.frame = Some(index);
            match ds.get(index) {
                Some(entities) => {
                    for entity in entities
                        .iter()
                        .filter(|e| e.is_class(self.style.player_class_id))
                    {
                        let pos = geom.to_pixel(entity.x, entity.y);
                        self.back.fill_circle(
                            pos.to_point(),
                            self.style.radius,
                            self.style.color_for(entity),
                        )?;
                        report.entities_drawn += 1;
                    }
                }
                None => {
                    tracing::debug!(frame = index.0, media_time, "no detections for frame");
                    report.data_gap = true;
                }
            }
        }

        let frame = self.back.snapshot()?;
        self.visible.blit(&frame)?;
        Ok(report)
    }

    /// Drive ticks from the video's frame notifications.
    ///
    /// Runs while a dataset is active and the video keeps delivering frames. A failing
    /// tick is logged and skipped; the loop itself never fails.
    #[tracing::instrument(skip_all)]
    pub async fn run<E: VideoElement + ?Sized>(&mut self, video: &mut E) -> RunSummary {
        let mut ticks = 0;
        let mut failed_ticks = 0;
        let mut data_gaps = 0;
        let mut last_frame = None;

        let stop = loop {
            self.sync_activation();
            if self.dataset.is_none() {
                break StopReason::NoDataset;
            }
            let Some(meta) = video.next_frame().await else {
                break StopReason::PlaybackStopped;
            };
            // A clear() may have landed while waiting for the frame.
            self.sync_activation();
            if self.dataset.is_none() {
                break StopReason::NoDataset;
            }
            match self.tick(meta.media_time) {
                Ok(report) => {
                    ticks += 1;
                    if report.data_gap {
                        data_gaps += 1;
                    }
                    last_frame = report.frame.or(last_frame);
                }
                Err(e) => {
                    failed_ticks += 1;
                    tracing::warn!(error = %e, media_time = meta.media_time, "overlay tick failed");
                }
            }
        };

        tracing::info!(ticks, failed_ticks, data_gaps, ?stop, "overlay loop stopped");
        RunSummary {
            ticks,
            failed_ticks,
            data_gaps,
            last_frame,
            stop,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/compositor.rs"]
mod tests;
