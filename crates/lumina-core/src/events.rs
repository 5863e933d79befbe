use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Normalized event sequence produced by the stream relay.
///
/// Wire form is one SSE frame per event: `event: <name>` followed by a JSON
/// `data:` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Content { text: String },
    Done { status: String },
    Complete { full_response: String },
    Error { error: String },
}

impl StreamEvent {
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::Content { text: text.into() }
    }

    pub fn done() -> Self {
        StreamEvent::Done {
            status: "complete".to_string(),
        }
    }

    pub fn complete(full_response: impl Into<String>) -> Self {
        StreamEvent::Complete {
            full_response: full_response.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        StreamEvent::Error {
            error: error.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Content { .. } => "content",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Error { .. } => "error",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            StreamEvent::Content { text } => json!({ "text": text }),
            StreamEvent::Done { status } => json!({ "status": status }),
            StreamEvent::Complete { full_response } => json!({ "full_response": full_response }),
            StreamEvent::Error { error } => json!({ "error": error }),
        }
    }

    pub fn to_sse_frame(&self) -> String {
        sse_frame(self.name(), &self.payload())
    }
}

pub fn sse_frame(event: &str, data: &Value) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_frame_matches_wire_format() {
        let frame = StreamEvent::content("Hello").to_sse_frame();
        assert_eq!(frame, "event: content\ndata: {\"text\":\"Hello\"}\n\n");
    }

    #[test]
    fn done_carries_complete_status() {
        assert_eq!(
            StreamEvent::done().payload(),
            json!({ "status": "complete" })
        );
    }

    #[test]
    fn complete_frame_escapes_newlines() {
        let frame = StreamEvent::complete("a\nb").to_sse_frame();
        assert_eq!(
            frame,
            "event: complete\ndata: {\"full_response\":\"a\\nb\"}\n\n"
        );
    }
}
