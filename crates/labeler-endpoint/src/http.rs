//! HTTP client for a hosted classification model.

use async_trait::async_trait;
use labeler_core::inference::{InferenceRequest, Invoker};
use reqwest::header::{ACCEPT, HeaderValue};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// Posts `{"instances": [...]}` to a model endpoint and returns the raw body.
///
/// No timeout and no retries: a hung endpoint hangs the caller.
pub struct EndpointClient {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl EndpointClient {
    /// `url` is the full invocation URL, e.g.
    /// `https://models.example.com/endpoints/blazingtext/invocations`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every call.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Invoker for EndpointClient {
    type Error = EndpointError;

    async fn invoke(&self, request: &InferenceRequest) -> Result<Vec<u8>, EndpointError> {
        info!(url = %self.url, instances = request.len(), "invoking classification endpoint");

        let mut builder = self
            .client
            .post(&self.url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EndpointError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        debug!(bytes = body.len(), "endpoint responded");
        Ok(body.to_vec())
    }
}
