use crate::advisory::prompts;
use crate::error::{ReconcileError, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const MAX_SUMMARY_TOKENS: u32 = 300;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking client for an OpenAI-compatible chat-completions endpoint.
///
/// Every failure surfaces as `AdvisoryUnavailable` so callers can degrade
/// to reconciliation output without a summary.
#[derive(Clone)]
pub struct AdvisoryClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AdvisoryClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(unavailable)?;
        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Point the client at a different OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request free-text commentary on one excerpt of mismatched records.
    pub fn summarize(&self, excerpt: &str) -> Result<String> {
        let prompt = format!(
            "{}\n{}\n{}",
            prompts::MISMATCH_REVIEW_PREFIX,
            excerpt,
            prompts::MISMATCH_REVIEW_SUFFIX
        );
        self.chat(&prompt)
    }

    fn chat(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_SUMMARY_TOKENS,
        };

        debug!("requesting advisory summary from {url}");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(unavailable)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(ReconcileError::AdvisoryUnavailable(format!(
                "advisory API error (status {status}): {body}"
            )));
        }

        let body: ChatResponse = res.json().map_err(unavailable)?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ReconcileError::AdvisoryUnavailable("no completion returned".to_string())
            })
    }
}

fn unavailable(err: reqwest::Error) -> ReconcileError {
    ReconcileError::AdvisoryUnavailable(err.to_string())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}
