//! Reqwest-based client for a Piston-compatible code execution API.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;

/// File name the buffer is submitted under.
pub const MAIN_FILE: &str = "main";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status code {}{}", .status.as_u16(), status_suffix(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response did not contain a run result")]
    MissingRun,
}

fn status_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// One entry of the `/runtimes` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    pub language: String,
    pub version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<SourceFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ExecutionRequest {
    /// Single-file request carrying `content` verbatim as [`MAIN_FILE`].
    pub fn single(language: &str, version: &str, content: &str) -> Self {
        Self {
            language: language.to_string(),
            version: version.to_string(),
            files: vec![SourceFile {
                name: MAIN_FILE.to_string(),
                content: content.to_string(),
            }],
            stdin: None,
            args: Vec::new(),
        }
    }
}

/// Output of one stage (compile or run) as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StageOutput {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub signal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub run: Option<StageOutput>,
    #[serde(default)]
    pub compile: Option<StageOutput>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PistonClient {
    http: Client,
    base_url: String,
}

impl PistonClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_client(http, &settings.api_base))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    pub async fn runtimes(&self) -> Result<Vec<Runtime>, ClientError> {
        let url = format!("{}/runtimes", self.base_url);
        tracing::debug!(%url, "fetching runtimes");
        let resp = self.http.get(&url).headers(Self::headers()).send().await?;
        let body = Self::checked_body(resp).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecuteResponse, ClientError> {
        let url = format!("{}/execute", self.base_url);
        tracing::debug!(
            %url,
            language = %request.language,
            version = %request.version,
            bytes = request.files.iter().map(|f| f.content.len()).sum::<usize>(),
            "sending execution request"
        );
        let resp = self
            .http
            .post(&url)
            .headers(Self::headers())
            .json(request)
            .send()
            .await?;
        let body = Self::checked_body(resp).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn checked_body(resp: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .or_else(|| {
                    let text = String::from_utf8_lossy(&body).trim().to_string();
                    (!text.is_empty()).then_some(text)
                });
            return Err(ClientError::Status { status, message });
        }
        Ok(body.to_vec())
    }
}
