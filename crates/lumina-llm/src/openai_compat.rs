//! OpenAI-compatible chat completion wire format.
//!
//! Every supported provider (Google's compatibility surface, OpenRouter,
//! OpenAI and custom gateways) accepts this request shape and streams
//! `data:` lines carrying `choices[0].delta.content`.

use lumina_core::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DONE_SENTINEL: &str = "[DONE]";

pub fn messages_to_openai_compat_json(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            json!({
                "role": role,
                "content": m.content,
            })
        })
        .collect()
}

/// Request body shared by streaming turns, plain chat and the probe.
pub fn build_request_body(model: &str, messages: &[Message], stream: bool, max_tokens: u32) -> Value {
    json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages),
        "stream": stream,
        "max_tokens": max_tokens,
    })
}

// --- streaming chunks ---

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

/// One decoded `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseData {
    Delta(String),
    Done,
    /// Not JSON, or JSON without a text delta (role-only or usage chunks).
    Ignored,
}

/// Lenient parse of an SSE `data:` payload.
///
/// - `"[DONE]"` -> `SseData::Done`
/// - Invalid JSON or no delta text -> `SseData::Ignored`
pub fn parse_sse_data(data: &str) -> SseData {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return SseData::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|text| !text.is_empty())
            .map(SseData::Delta)
            .unwrap_or(SseData::Ignored),
        Err(_) => {
            if !data.is_empty() {
                log::debug!("Ignoring non-JSON stream payload: {}", data);
            }
            SseData::Ignored
        }
    }
}

// --- non-streaming responses ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// `error.message` from a provider error envelope, else the raw body.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
