use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::Fps;
use crate::foundation::error::{TacticalError, TacticalResult};

/// Runtime settings for the analysis client and the board renderer.
///
/// Every field has a default, so an empty JSON object is a valid config file.
/// Environment overrides are applied by [`TacticalConfig::with_env_overrides`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TacticalConfig {
    /// Base URL of the analysis backend, without a trailing slash.
    pub server_url: String,
    /// Path of the multipart upload endpoint.
    pub upload_path: String,
    /// Prefix of the polling endpoint; the result id is appended as a path segment.
    pub result_path: String,
    /// Multipart field name carrying the video file.
    pub upload_field: String,
    pub poll_interval_ms: u64,
    pub analysis_fps: u32,
    /// Entity class drawn on the board.
    pub player_class_id: u32,
    /// Optional background texture for the pitch.
    pub texture_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for TacticalConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            upload_path: "/tasks/upload".to_string(),
            result_path: "/tasks/result".to_string(),
            upload_field: "file".to_string(),
            poll_interval_ms: 500,
            analysis_fps: 30,
            player_class_id: 0,
            texture_path: None,
            request_timeout_secs: 300,
        }
    }
}

impl TacticalConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> TacticalResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| TacticalError::validation(format!("parse config JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> TacticalResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TacticalError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Load `path` when given, fall back to defaults otherwise, then apply env overrides.
    pub fn load(path: Option<&Path>) -> TacticalResult<Self> {
        let base = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        let cfg = base.with_env_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `TACTICAL_*` overrides read through `lookup`. Unparseable values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("TACTICAL_SERVER_URL").filter(|v| !v.is_empty()) {
            self.server_url = url;
        }
        if let Some(ms) = lookup("TACTICAL_POLL_INTERVAL_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            self.poll_interval_ms = ms;
        }
        if let Some(fps) = lookup("TACTICAL_ANALYSIS_FPS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.analysis_fps = fps;
        }
        if let Some(tex) = lookup("TACTICAL_TEXTURE").filter(|v| !v.is_empty()) {
            self.texture_path = Some(PathBuf::from(tex));
        }
        self
    }

    pub fn validate(&self) -> TacticalResult<()> {
        if self.analysis_fps == 0 {
            return Err(TacticalError::validation("analysis_fps must be > 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(TacticalError::validation("poll_interval_ms must be > 0"));
        }
        if self.upload_field.trim().is_empty() {
            return Err(TacticalError::validation("upload_field must not be empty"));
        }
        Ok(())
    }

    pub fn fps(&self) -> TacticalResult<Fps> {
        Fps::new(self.analysis_fps, 1)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_url(&self) -> String {
        join_url(&self.server_url, &self.upload_path)
    }

    pub fn result_url(&self, result_id: &str) -> String {
        format!("{}/{}", join_url(&self.server_url, &self.result_path), result_id)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/').trim_end_matches('/')
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
