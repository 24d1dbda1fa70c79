use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;

use crate::foundation::config::TacticalConfig;
use crate::foundation::error::{TacticalError, TacticalResult};
use crate::job::wire::{PollResponse, UploadRejection, UploadResponse};

/// Backend-assigned identity of one analysis job.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub result_id: String,
}

/// A video file ready to be sent as a multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl VideoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> TacticalResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read video '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_owned());
        Ok(Self { file_name, bytes })
    }
}

/// The remote analysis service.
///
/// Each call is one outstanding request; callers never issue a new one before the previous
/// call returned.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn upload(&self, video: &VideoUpload) -> TacticalResult<JobHandle>;

    async fn poll(&self, job: &JobHandle) -> TacticalResult<PollResponse>;
}

/// [`AnalysisBackend`] over HTTP: multipart upload plus JSON status polls.
pub struct HttpBackend {
    client: reqwest::Client,
    config: TacticalConfig,
}

impl HttpBackend {
    pub fn new(config: &TacticalConfig) -> TacticalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TacticalError::transport(format!("build http client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: reqwest::Client, config: &TacticalConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, (u16, String)> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err((status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    #[tracing::instrument(skip_all, fields(file = %video.file_name, bytes = video.bytes.len()))]
    async fn upload(&self, video: &VideoUpload) -> TacticalResult<JobHandle> {
        let part = reqwest::multipart::Part::bytes(video.bytes.clone())
            .file_name(video.file_name.clone());
        let form = reqwest::multipart::Form::new().part(self.config.upload_field.clone(), part);

        let url = self.config.upload_url();
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TacticalError::upload(format!("POST {url}: {e}")))?;

        let response = Self::ensure_success(response).await.map_err(|(status, body)| {
            let message = serde_json::from_str::<UploadRejection>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(body);
            TacticalError::upload(format!("server answered {status}: {message}"))
        })?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| TacticalError::upload(format!("malformed upload response: {e}")))?;
        tracing::debug!(result_id = %body.result_id, "upload accepted");
        Ok(JobHandle {
            result_id: body.result_id,
        })
    }

    async fn poll(&self, job: &JobHandle) -> TacticalResult<PollResponse> {
        let url = self.config.result_url(&job.result_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TacticalError::transport(format!("GET {url}: {e}")))?;
        let response = Self::ensure_success(response)
            .await
            .map_err(|(status, body)| {
                TacticalError::transport(format!("GET {url} answered {status}: {body}"))
            })?;
        response
            .json::<PollResponse>()
            .await
            .map_err(|e| TacticalError::serde(format!("malformed poll response: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/client.rs"]
mod tests;
