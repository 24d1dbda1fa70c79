pub type TacticalResult<T> = Result<T, TacticalError>;

/// Error taxonomy shared by the board renderer and the analysis job client.
///
/// Only [`TacticalError::Upload`] is meant to reach the user as a hard failure. Texture
/// load problems and missing frames are tolerated by the renderers and never surface
/// here from a render tick.
#[derive(thiserror::Error, Debug)]
pub enum TacticalError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("asset load error: {0}")]
    Asset(String),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("analysis job {result_id} failed: {reason}")]
    JobFailed { result_id: String, reason: String },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TacticalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn job_failed(result_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::JobFailed {
            result_id: result_id.into(),
            reason: reason.into(),
        }
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for failures the user should see as a hard error rather than a degraded render.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::JobFailed { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
