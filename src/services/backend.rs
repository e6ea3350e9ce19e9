//! HTTP client for the external analysis backend.
//!
//! Two endpoints are used: a multipart CSV upload, and a JSON question endpoint
//! whose answer may carry a dataframe and a chart description. Calls are never
//! retried or cancelled; a failure is reported to the caller once.

use crate::config::BackendConfig;
use crate::core::TabularFrame;
use crate::core::value;
use crate::error::BackendError;
use reqwest::Client as HttpClient;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// The answer field of a question response. The backend sometimes wraps the
/// text in a second `{"answer": ...}` object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Nested { answer: Value },
    Other(Value),
}

impl Answer {
    /// The answer text with one level of nesting removed.
    pub fn text(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Nested { answer } => value::display(answer),
            Answer::Other(v) => value::display(v),
        }
    }
}

impl Default for Answer {
    fn default() -> Self {
        Answer::Other(Value::Null)
    }
}

/// Chart description attached to an answer. Keys may be null or missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartDescriptor {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub x_key: Option<String>,
    #[serde(default)]
    pub y_key: Option<String>,
}

impl ChartDescriptor {
    /// Category and value keys, when both are present and non-empty.
    pub fn keys(&self) -> Option<(&str, &str)> {
        let x = self.x_key.as_deref().filter(|k| !k.is_empty())?;
        let y = self.y_key.as_deref().filter(|k| !k.is_empty())?;
        Some((x, y))
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Response of the question endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Answer,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_dataframe: bool,
    #[serde(default)]
    pub dataframe: Option<TabularFrame>,
    #[serde(default)]
    pub chart: Option<ChartDescriptor>,
}

impl AskResponse {
    /// The dataframe, only when the backend flagged the answer as one.
    pub fn frame(&self) -> Option<&TabularFrame> {
        if self.is_dataframe {
            self.dataframe.as_ref()
        } else {
            None
        }
    }
}

/// Upload acknowledgement. The body is opaque; only success matters.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Async client for the analysis backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: HttpClient,
    base_url: String,
    upload_path: String,
    ask_path: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BackendError::InvalidUrl(config.base_url.clone()));
        }
        let http = HttpClient::builder()
            .user_agent(concat!("optix/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            base_url,
            upload_path: config.upload_path.clone(),
            ask_path: config.ask_path.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Upload a CSV file as the multipart field `file`.
    pub async fn upload_csv(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, BackendError> {
        let url = self.endpoint(&self.upload_path);
        info!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let resp = self.http.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(UploadReceipt {
            status: status.as_u16(),
            body,
        })
    }

    /// Ask a question about the uploaded data.
    pub async fn ask(&self, question: &str) -> Result<AskResponse, BackendError> {
        let url = self.endpoint(&self.ask_path);
        debug!("Asking backend: {question}");
        let resp = self
            .http
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
