use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::{TacticalError, TacticalResult};
use crate::job::client::{AnalysisBackend, JobHandle, VideoUpload};
use crate::job::wire::{PollOutcome, PollResponse, Progress};
use crate::overlay::compositor::{OverlaySink, SharedDataset};

/// Lifecycle of one analysis job. Phases only ever move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Uploading,
    Polling,
    Succeeded,
    Failed,
}

impl JobPhase {
    fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Uploading => 1,
            Self::Polling => 2,
            Self::Succeeded | Self::Failed => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn can_advance_to(self, next: JobPhase) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// What the caller's progress callback is told.
#[derive(Clone, Debug, PartialEq)]
pub enum JobReport {
    /// Upload started; sent before the network round trip completes.
    Submitted,
    Pending(Progress),
    Succeeded(SharedDataset),
    Failed { reason: String },
}

/// Delay between polls. Injected so tests run without real time passing.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Uploads a video and polls the backend sequentially until the job reaches a terminal state.
///
/// A new poll is issued only after the previous response has been classified and reported,
/// so at most one request per job is ever outstanding. There is no retry and no cancellation.
pub struct AnalysisJob<B, S = TokioSleeper> {
    backend: B,
    sleeper: S,
    poll_interval: Duration,
    phase: JobPhase,
    handle: Option<JobHandle>,
    polls: u64,
}

impl<B: AnalysisBackend> AnalysisJob<B, TokioSleeper> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        Self::with_sleeper(backend, TokioSleeper, poll_interval)
    }
}

impl<B: AnalysisBackend, S: Sleeper> AnalysisJob<B, S> {
    pub fn with_sleeper(backend: B, sleeper: S, poll_interval: Duration) -> Self {
        Self {
            backend,
            sleeper,
            poll_interval,
            phase: JobPhase::Idle,
            handle: None,
            polls: 0,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    /// Status requests issued so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    fn advance(&mut self, next: JobPhase) {
        if !self.phase.can_advance_to(next) {
            tracing::warn!(from = ?self.phase, to = ?next, "ignored backwards job transition");
            return;
        }
        tracing::info!(from = ?self.phase, to = ?next, "job phase");
        self.phase = next;
    }

    fn fail(&mut self, reason: String, report: &mut impl FnMut(&JobReport)) {
        self.advance(JobPhase::Failed);
        report(&JobReport::Failed { reason });
    }

    /// Upload `video` and start the job. Reports [`JobReport::Submitted`] right away.
    #[tracing::instrument(skip_all, fields(file = %video.file_name))]
    pub async fn submit(
        &mut self,
        video: &VideoUpload,
        report: &mut impl FnMut(&JobReport),
    ) -> TacticalResult<JobHandle> {
        if self.phase != JobPhase::Idle {
            return Err(TacticalError::validation(format!(
                "job already submitted (phase {:?})",
                self.phase
            )));
        }
        self.advance(JobPhase::Uploading);
        report(&JobReport::Submitted);

        match self.backend.upload(video).await {
            Ok(handle) => {
                tracing::info!(result_id = %handle.result_id, "video uploaded");
                self.handle = Some(handle.clone());
                self.advance(JobPhase::Polling);
                Ok(handle)
            }
            Err(e) => {
                let e = match e {
                    e @ TacticalError::Upload(_) => e,
                    other => TacticalError::upload(other.to_string()),
                };
                tracing::error!(error = %e, "upload failed");
                self.fail(e.to_string(), report);
                Err(e)
            }
        }
    }

    /// Poll until the backend reports a terminal state.
    #[tracing::instrument(skip_all, fields(result_id = tracing::field::Empty))]
    pub async fn poll_until_terminal(
        &mut self,
        report: &mut impl FnMut(&JobReport),
    ) -> TacticalResult<SharedDataset> {
        let handle = match (&self.handle, self.phase) {
            (Some(handle), JobPhase::Polling) => handle.clone(),
            _ => {
                return Err(TacticalError::validation(format!(
                    "job is not polling (phase {:?})",
                    self.phase
                )));
            }
        };
        tracing::Span::current().record("result_id", handle.result_id.as_str());

        loop {
            let polled = self.backend.poll(&handle).await;
            self.polls += 1;
            let outcome = match polled.and_then(PollResponse::classify) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "status poll failed");
                    self.fail(e.to_string(), report);
                    return Err(e);
                }
            };

            match outcome {
                PollOutcome::Pending(progress) => {
                    tracing::debug!(%progress, polls = self.polls, "job pending");
                    report(&JobReport::Pending(progress));
                    self.sleeper.sleep(self.poll_interval).await;
                }
                PollOutcome::Succeeded(dataset) => {
                    let dataset = Arc::new(dataset);
                    self.advance(JobPhase::Succeeded);
                    tracing::info!(frames = dataset.len(), polls = self.polls, "job succeeded");
                    report(&JobReport::Succeeded(Arc::clone(&dataset)));
                    return Ok(dataset);
                }
                PollOutcome::Failed(reason) => {
                    tracing::error!(result_id = %handle.result_id, %reason, "analysis job failed");
                    self.fail(reason.clone(), report);
                    return Err(TacticalError::job_failed(handle.result_id, reason));
                }
            }
        }
    }

    /// Submit, poll to completion and hand a successful result to `sink`.
    ///
    /// Nothing reaches `sink` unless the job succeeded.
    pub async fn run<K: OverlaySink + ?Sized>(
        &mut self,
        video: &VideoUpload,
        sink: &K,
        mut report: impl FnMut(&JobReport),
    ) -> TacticalResult<SharedDataset> {
        self.submit(video, &mut report).await?;
        let dataset = self.poll_until_terminal(&mut report).await?;
        sink.activate(Arc::clone(&dataset));
        Ok(dataset)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/machine.rs"]
mod tests;
