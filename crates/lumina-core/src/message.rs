use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Inbound chat request: the new user message plus prior history, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ChatRequest {
    /// History followed by the new user message.
    pub fn conversation(&self) -> Vec<Message> {
        let mut messages = self.history.clone();
        messages.push(Message::user(self.message.clone()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn chat_request_history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"Hello"}"#).unwrap();
        assert!(request.history.is_empty());
        assert_eq!(request.project_id, None);
    }

    #[test]
    fn conversation_appends_user_message_last() {
        let request = ChatRequest {
            message: "second".to_string(),
            history: vec![Message::user("first"), Message::assistant("reply")],
            project_id: None,
        };
        let conversation = request.conversation();
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation[0].content, "first");
        assert_eq!(conversation[2], Message::user("second"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let json = r#"{"role":"tool","content":"x"}"#;
        assert!(serde_json::from_str::<Message>(json).is_err());
    }
}
