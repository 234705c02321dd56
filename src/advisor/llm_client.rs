// =============================================================================
// Completion Client — OpenAI-compatible chat-completions endpoint
// =============================================================================
//
// SECURITY: The API key is never logged or serialized.  It is sent only as a
// bearer token header.
//
// The returned text is treated as opaque: it is neither parsed nor validated
// beyond checking that the response carried a message.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Model and sampling settings for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client.
#[derive(Clone)]
pub struct LlmClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl LlmClient {
    /// Create a new `LlmClient`.
    ///
    /// # Arguments
    /// * `api_key`  - bearer key; may be empty, in which case every call fails
    ///   fast without touching the network.
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "LlmClient initialised");

        Self {
            api_key: api_key.into(),
            base_url,
            client,
        }
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// POST /chat/completions with a single user message.
    #[instrument(skip(self, settings, prompt), fields(model = %settings.model), name = "llm::complete")]
    pub async fn complete(&self, settings: &CompletionSettings, prompt: &str) -> Result<String> {
        if !self.is_configured() {
            anyhow::bail!("completion API key is not configured");
        }

        let body = build_request(settings, prompt);

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("POST /chat/completions request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read completion response body")?;

        if !status.is_success() {
            anyhow::bail!("completion endpoint returned {}: {}", status, text);
        }

        let content = parse_response(&text)?;
        debug!(chars = content.chars().count(), "completion received");
        Ok(content)
    }
}

/// Build the request payload.
fn build_request<'a>(settings: &'a CompletionSettings, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model: &settings.model,
        temperature: settings.temperature,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: settings.max_tokens,
    }
}

/// Extract the first choice's message text.
fn parse_response(body: &str) -> Result<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).context("failed to parse completion response")?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|s| !s.trim().is_empty())
        .context("completion response carried no message content")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CompletionSettings {
        CompletionSettings {
            model: "gpt-4o-mini".into(),
            temperature: 0.5,
            max_tokens: None,
        }
    }

    #[test]
    fn request_shape() {
        let s = settings();
        let json = serde_json::to_value(build_request(&s, "hello")).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn request_with_token_cap() {
        let s = CompletionSettings {
            max_tokens: Some(800),
            ..settings()
        };
        let json = serde_json::to_value(build_request(&s, "x")).unwrap();
        assert_eq!(json["max_tokens"], 800);
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"id":"c1","choices":[{"index":0,"message":{"role":"assistant","content":"Buy the dip."}}],"usage":{"total_tokens":12}}"#;
        assert_eq!(parse_response(body).unwrap(), "Buy the dip.");
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(parse_response(r#"{"choices":[]}"#).is_err());
        assert!(parse_response(r#"{"choices":[{"message":{"content":null}}]}"#).is_err());
        assert!(parse_response("not json").is_err());
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = LlmClient::new("k", "https://api.example.com/v1/", 5);
        assert_eq!(c.completions_url(), "https://api.example.com/v1/chat/completions");
        assert!(c.is_configured());
    }

    #[tokio::test]
    async fn unconfigured_client_fails_fast() {
        let c = LlmClient::new("", "http://127.0.0.1:9", 1);
        assert!(!c.is_configured());
        let err = c.complete(&settings(), "hi").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
