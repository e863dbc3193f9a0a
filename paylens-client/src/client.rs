//! HTTP client for the statement analysis endpoint.
//!
//! One multipart POST per call, file under the `file` field, no retries. Every
//! failure is mapped to an [`AnalysisError`]; raw transport errors go to the
//! log only.

use paylens_core::error::FALLBACK_DETAIL;
use paylens_core::{AnalysisError, AnalysisResult, Analyzer};
use paylens_ingest::UploadCandidate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Multipart field the backend reads the statement from.
pub const FILE_FIELD: &str = "file";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid analysis endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("building http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    endpoint: Url,
}

impl AnalysisClient {
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let url = Url::parse(endpoint).map_err(|e| ClientError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: url,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Upload the statement and decode the analysis.
    pub async fn post_statement(
        &self,
        candidate: &UploadCandidate,
    ) -> Result<AnalysisResult, AnalysisError> {
        let part = Part::bytes(candidate.bytes.clone())
            .file_name(candidate.file_name.clone())
            .mime_str(&candidate.media_type)
            .map_err(|e| AnalysisError::transport(format!("bad media type: {e}")))?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::info!(
            endpoint = %self.endpoint,
            file = %candidate.file_name,
            size = candidate.size(),
            "submitting statement"
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "analysis request failed");
                AnalysisError::transport(e.to_string())
            })?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!(status, error = %e, "reading analysis response failed");
            AnalysisError::Transport {
                status: Some(status),
                message: e.to_string(),
            }
        })?;

        interpret_response(status, &body)
    }
}

impl Analyzer for AnalysisClient {
    async fn analyze(&self, candidate: &UploadCandidate) -> Result<AnalysisResult, AnalysisError> {
        self.post_statement(candidate).await
    }
}

/// Most specific error text in a response body: `details`, then `error`.
pub fn error_detail(body: &Value) -> Option<&str> {
    ["details", "error"]
        .iter()
        .filter_map(|k| body.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Map status + body to a result.
///
/// A 2xx body that still carries `error`/`details` is a failure.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    let json: Option<Value> = serde_json::from_slice(body).ok();
    let detail = json.as_ref().and_then(error_detail).map(str::to_string);

    if !(200..300).contains(&status) {
        tracing::warn!(status, detail = detail.as_deref().unwrap_or("-"), "analysis endpoint returned an error");
        return Err(match detail {
            Some(message) => AnalysisError::Backend {
                status: Some(status),
                message,
            },
            None => AnalysisError::Transport {
                status: Some(status),
                message: FALLBACK_DETAIL.to_string(),
            },
        });
    }

    if let Some(message) = detail {
        return Err(AnalysisError::Backend {
            status: Some(status),
            message,
        });
    }

    let Some(json) = json else {
        return Err(AnalysisError::Transport {
            status: Some(status),
            message: "response body is not JSON".to_string(),
        });
    };

    serde_json::from_value(json).map_err(|e| AnalysisError::Transport {
        status: Some(status),
        message: format!("unexpected response shape: {e}"),
    })
}
