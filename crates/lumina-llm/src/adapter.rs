use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use lumina_core::{ConfigError, Message, Provider, Settings};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

use crate::endpoint::{provider_for_endpoint, resolve_endpoint};
use crate::error::{LLMError, Result};
use crate::openai_compat::{build_request_body, extract_error_message, ChatCompletionResponse, Usage};

pub const PROBE_PROMPT: &str = "Say \"Connection successful!\" and nothing else.";
pub const PROBE_MAX_TOKENS: u32 = 50;
pub const TURN_MAX_TOKENS: u32 = 16384;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
pub const TURN_TIMEOUT: Duration = Duration::from_secs(300);

const OPENROUTER_REFERER: &str = "http://localhost";
const OPENROUTER_TITLE: &str = "LuminaAI Builder";

/// Raw response body of a streaming turn, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionSuccess {
    pub message: String,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Sends chat-completion requests for one [`Settings`] snapshot.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    client: Client,
    settings: Settings,
    probe_timeout: Duration,
    turn_timeout: Duration,
}

impl ProviderAdapter {
    pub fn new(settings: Settings) -> Self {
        Self {
            client: Client::new(),
            settings,
            probe_timeout: PROBE_TIMEOUT,
            turn_timeout: TURN_TIMEOUT,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolve_endpoint(&self) -> String {
        resolve_endpoint(&self.settings)
    }

    pub fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.settings.api_key()))
            .map_err(|_| {
                ConfigError::Parse("API key contains characters not allowed in a header".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        if provider_for_endpoint(&self.settings.endpoint) == Some(Provider::OpenRouter) {
            headers.insert(
                HeaderName::from_static("http-referer"),
                HeaderValue::from_static(OPENROUTER_REFERER),
            );
            headers.insert(
                HeaderName::from_static("x-title"),
                HeaderValue::from_static(OPENROUTER_TITLE),
            );
        }

        Ok(headers)
    }

    /// System prompt first (only when non-empty), then history in order.
    pub fn format_messages(&self, history: &[Message], system_prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !system_prompt.is_empty() {
            messages.push(Message::system(system_prompt));
        }
        messages.extend_from_slice(history);
        messages
    }

    /// Small non-streaming probe against the configured endpoint.
    pub async fn test_connection(&self) -> Result<ConnectionSuccess> {
        let messages = [Message::user(PROBE_PROMPT)];
        let body = build_request_body(&self.settings.model, &messages, false, PROBE_MAX_TOKENS);
        let response = self.post(&body, self.probe_timeout).await?;
        let parsed = read_completion(response).await?;

        Ok(ConnectionSuccess {
            message: parsed.content().unwrap_or_default().trim().to_string(),
            model: self.settings.model.clone(),
            endpoint: self.resolve_endpoint(),
        })
    }

    /// Start a streaming turn.
    ///
    /// Returns once the provider has answered with a success status; the body
    /// is then read lazily through the returned stream. Dropping the stream
    /// closes the connection.
    pub async fn stream_chat(&self, history: &[Message], system_prompt: &str) -> Result<ByteStream> {
        let messages = self.format_messages(history, system_prompt);
        let body = build_request_body(&self.settings.model, &messages, true, TURN_MAX_TOKENS);
        let response = self.post(&body, self.turn_timeout).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(LLMError::from));
        Ok(Box::pin(stream))
    }

    /// Non-streaming turn.
    pub async fn chat(&self, history: &[Message], system_prompt: &str) -> Result<ChatResponse> {
        let messages = self.format_messages(history, system_prompt);
        let body = build_request_body(&self.settings.model, &messages, false, TURN_MAX_TOKENS);
        let response = self.post(&body, self.turn_timeout).await?;
        let parsed = read_completion(response).await?;

        let content = parsed
            .content()
            .ok_or_else(|| LLMError::MalformedResponse("response has no message content".to_string()))?
            .to_string();
        Ok(ChatResponse {
            content,
            usage: parsed.usage,
        })
    }

    async fn post(&self, body: &Value, timeout: Duration) -> Result<Response> {
        self.settings.validate()?;
        let endpoint = self.resolve_endpoint();
        log::info!(
            "POST {} (provider: {}, model: {})",
            endpoint,
            self.settings.provider,
            self.settings.model
        );

        let response = self
            .client
            .post(&endpoint)
            .headers(self.build_headers()?)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {}", endpoint, e);
                LLMError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            log::error!("Provider returned HTTP {}: {}", status.as_u16(), message);
            return Err(LLMError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

async fn read_completion(response: Response) -> Result<ChatCompletionResponse> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| LLMError::MalformedResponse(e.to_string()))
}
