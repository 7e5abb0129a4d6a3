//! Narrow asynchronous "generate text from a prompt" capability.
//!
//! Every implementation resolves with a string, never an error: transport
//! failures, bad statuses, and unparseable bodies all collapse into a
//! sentinel string starting with [`FALLBACK_PREFIX`]. Agents test the prefix
//! and degrade to a status message instead of aborting the turn.

use async_trait::async_trait;
use contracts::{TextGenConfig, FALLBACK_PREFIX};
use serde_json::Value;
use tracing::debug;

/// Role instruction handed to the generator for clarifying questions.
pub const INQUISITOR_ROLE: &str = "You are a ruthless design reviewer at a game studio. \
Given one design fact, ask a single short probing question that exposes what is underspecified. \
Reply with the question only.";

/// Role instruction for bug narratives.
pub const PRODUCER_ROLE: &str = "You are a producer writing a one-line bug report. \
The build broke because the team guessed at an unanswered design question. \
Describe the resulting defect in one sentence.";

/// Role instruction for promotional blurbs.
pub const MARKETING_ROLE: &str = "You are a games marketer. Write one punchy sentence \
hyping the given feature to players. No hashtags.";

pub fn is_fallback(text: &str) -> bool {
    text.starts_with(FALLBACK_PREFIX)
}

fn fallback(reason: impl AsRef<str>) -> String {
    format!("{FALLBACK_PREFIX} {}", reason.as_ref())
}

/// The one external capability the kernel depends on. No retries; the only
/// timeout is whatever the underlying transport applies.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, role_instruction: &str, context: &str) -> String;
}

/// reqwest-backed client speaking the Ollama generate endpoint,
/// non-streaming.
pub struct HttpTextClient {
    client: reqwest::Client,
    config: TextGenConfig,
}

impl HttpTextClient {
    pub fn new(config: TextGenConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for HttpTextClient {
    async fn generate(&self, role_instruction: &str, context: &str) -> String {
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": format!("{role_instruction}\n\n{context}"),
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        let response = match self.client.post(self.endpoint()).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(target: "studio.textgen", error = %err, "generation request failed");
                return fallback(format!("request failed: {err}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(target: "studio.textgen", %status, "generation endpoint refused");
            return fallback(format!("endpoint returned {status}"));
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(err) => return fallback(format!("unparseable response: {err}")),
        };

        match payload.get("response").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => fallback("empty response body"),
        }
    }
}

/// Client for offline runs: always the sentinel. The simulation still
/// advances; agents simply report degraded status text.
pub struct FallbackTextClient;

#[async_trait]
impl TextGenerator for FallbackTextClient {
    async fn generate(&self, _role_instruction: &str, _context: &str) -> String {
        fallback("generation service offline")
    }
}

/// Client that replays a fixed reply for every request and records the
/// requests it saw. Used by kernel tests to script agent behavior.
pub struct CannedTextClient {
    reply: String,
    requests: std::sync::Mutex<Vec<(String, String)>>,
}

impl CannedTextClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Role/context pairs seen so far, in call order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl TextGenerator for CannedTextClient {
    async fn generate(&self, role_instruction: &str, context: &str) -> String {
        self.requests
            .lock()
            .expect("requests lock")
            .push((role_instruction.to_string(), context.to_string()));
        self.reply.clone()
    }
}
