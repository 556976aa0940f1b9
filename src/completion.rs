//! Remote completion call.
//!
//! One request per invocation, no retries. Unless silent, the spinner runs
//! for exactly the duration of the request and is always stopped before
//! `complete` returns, whether the call succeeded or not.

use crate::config::Config;
use crate::credentials::Credential;
use crate::error::HowError;
use crate::http_client::{HttpClient, HttpResponse, ReqwestHttpClient};
use crate::prompt::RequestPayload;
use crate::spinner::ProgressIndicator;
use serde::Deserialize;
use serde_json::json;
use std::io::Write;
use tracing::{debug, info};

pub const TEMPERATURE: f64 = 0.1;
pub const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Factory for the spinner's output stream.
type SpinnerSink = Box<dyn Fn() -> Box<dyn Write + Send> + Send + Sync>;

pub struct CompletionClient<H: HttpClient = ReqwestHttpClient> {
    http: H,
    url: String,
    model: String,
    spinner_sink: Option<SpinnerSink>,
}

impl CompletionClient<ReqwestHttpClient> {
    pub fn new(config: &Config) -> Self {
        Self::with_http(config, ReqwestHttpClient::new())
    }
}

impl<H: HttpClient> CompletionClient<H> {
    pub fn with_http(config: &Config, http: H) -> Self {
        Self {
            http,
            url: config.completions_url(),
            model: config.model.clone(),
            spinner_sink: None,
        }
    }

    /// Sends the spinner somewhere other than stderr.
    pub fn with_spinner_sink(
        mut self,
        sink: impl Fn() -> Box<dyn Write + Send> + Send + Sync + 'static,
    ) -> Self {
        self.spinner_sink = Some(Box::new(sink));
        self
    }

    /// Performs the completion request and returns the raw model text.
    pub async fn complete(
        &self,
        credential: &Credential,
        payload: RequestPayload,
        silent: bool,
    ) -> Result<String, HowError> {
        let spinner = (!silent).then(|| match &self.spinner_sink {
            Some(sink) => ProgressIndicator::start_with(sink()),
            None => ProgressIndicator::start(),
        });

        let result = self.send(credential, payload).await;

        if let Some(spinner) = spinner {
            spinner.stop().await;
        }
        result
    }

    async fn send(&self, credential: &Credential, payload: RequestPayload) -> Result<String, HowError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": payload.into_inner()
                }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS
        });
        let authorization = format!("Bearer {}", credential.expose());
        let headers = [
            ("Authorization", authorization.as_str()),
            ("Content-Type", "application/json"),
        ];

        info!("Requesting completion from {} with model {}", self.url, self.model);
        let response = self
            .http
            .post_json(&self.url, &headers, &body)
            .await
            .map_err(|e| HowError::Api(format!("{:#}", e)))?;

        parse_completion(&response)
    }
}

/// Extracts the first choice's text, or turns the response into an error.
fn parse_completion(response: &HttpResponse) -> Result<String, HowError> {
    if !response.is_success() {
        let detail = serde_json::from_str::<ErrorEnvelope>(&response.body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| response.body.trim().to_string());
        return Err(HowError::Api(format!("HTTP {}: {}", response.status, detail)));
    }

    let parsed: ChatResponse = serde_json::from_str(&response.body)
        .map_err(|e| HowError::Api(format!("Malformed completion response: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| HowError::Api("Completion response contained no text".to_string()))?;

    debug!("Received {} bytes of completion text", content.len());
    Ok(content)
}
