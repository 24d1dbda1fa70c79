//! JSON bodies exchanged with the analysis backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TacticalError, TacticalResult};
use crate::track::model::{CoordinateDataset, FrameCoordinates};

/// Body of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub result_id: String,
}

/// Body of a rejected upload (e.g. a missing file part).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadRejection {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a status poll.
///
/// `successful` is `null` until the job is ready. `value` carries progress while pending,
/// the result when succeeded and the failure description otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    pub ready: bool,
    #[serde(default)]
    pub successful: Option<bool>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Progress of a pending job as far as the backend tells us.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// `{status: 0.4}`
    Fraction(f64),
    /// `{current: 2, total: 5}`
    Counted { current: u64, total: u64 },
    Unknown,
}

impl Progress {
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        let Some(obj) = value.and_then(serde_json::Value::as_object) else {
            return Self::Unknown;
        };
        let current = obj.get("current").and_then(serde_json::Value::as_u64);
        let total = obj.get("total").and_then(serde_json::Value::as_u64);
        if let (Some(current), Some(total)) = (current, total) {
            return Self::Counted { current, total };
        }
        match obj.get("status").and_then(serde_json::Value::as_f64) {
            Some(f) if f.is_finite() => Self::Fraction(f.clamp(0.0, 1.0)),
            _ => Self::Unknown,
        }
    }

    /// Completion in `0..=1`, when known.
    pub fn fraction(&self) -> Option<f64> {
        match *self {
            Self::Fraction(f) => Some(f),
            Self::Counted { total: 0, .. } => None,
            Self::Counted { current, total } => Some((current as f64 / total as f64).min(1.0)),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fraction(v) => write!(f, "{:.0}%", v * 100.0),
            Self::Counted { current, total } => write!(f, "{current} / {total}"),
            Self::Unknown => f.write_str("pending"),
        }
    }
}

/// A poll response sorted into the three states the job machine acts on.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    Pending(Progress),
    Succeeded(CoordinateDataset),
    Failed(String),
}

impl PollResponse {
    pub fn pending(progress: serde_json::Value) -> Self {
        Self {
            ready: false,
            successful: None,
            value: Some(progress),
        }
    }

    pub fn succeeded(value: serde_json::Value) -> Self {
        Self {
            ready: true,
            successful: Some(true),
            value: Some(value),
        }
    }

    pub fn failed(value: serde_json::Value) -> Self {
        Self {
            ready: true,
            successful: Some(false),
            value: Some(value),
        }
    }

    pub fn classify(self) -> TacticalResult<PollOutcome> {
        if !self.ready {
            return Ok(PollOutcome::Pending(Progress::from_value(self.value.as_ref())));
        }
        if self.successful != Some(true) {
            return Ok(PollOutcome::Failed(failure_reason(self.value.as_ref())));
        }
        let value = self
            .value
            .ok_or_else(|| TacticalError::serde("succeeded job carried no value"))?;
        decode_result(value).map(PollOutcome::Succeeded)
    }
}

fn decode_result(value: serde_json::Value) -> TacticalResult<CoordinateDataset> {
    let serde_json::Value::Object(mut obj) = value else {
        return Err(TacticalError::serde("job result is not an object"));
    };
    // Older workers wrap the map in `status` instead of `coordinates`.
    let coords = obj
        .remove("coordinates")
        .or_else(|| obj.remove("status").filter(serde_json::Value::is_object))
        .ok_or_else(|| TacticalError::serde("job result has no coordinates"))?;
    let wire: HashMap<String, FrameCoordinates> =
        serde_json::from_value(coords).map_err(|e| TacticalError::serde(e.to_string()))?;
    CoordinateDataset::from_wire(wire)
}

fn failure_reason(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Object(obj)) => ["message", "error_message", "error", "exc_message"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(serde_json::Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| serde_json::Value::Object(obj.clone()).to_string()),
        Some(serde_json::Value::Null) | None => "backend reported failure".to_owned(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/wire.rs"]
mod tests;
