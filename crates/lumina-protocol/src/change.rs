use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    #[default]
    Create,
    Update,
    Patch,
    Delete,
}

impl ChangeAction {
    /// Unrecognized or empty values fall back to `Create`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "update" => ChangeAction::Update,
            "patch" => ChangeAction::Patch,
            "delete" => ChangeAction::Delete,
            "create" => ChangeAction::Create,
            other => {
                if !other.is_empty() {
                    log::debug!("Unrecognized change action '{}', treating as create", other);
                }
                ChangeAction::Create
            }
        }
    }

    /// Whether the block carries full file content.
    pub fn writes_content(&self) -> bool {
        matches!(self, ChangeAction::Create | ChangeAction::Update)
    }
}

/// Find/replace pair; both sides are verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub find: String,
    pub replace: String,
}

impl Patch {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// One file operation extracted from AI output.
///
/// Produced only by the parser, which guarantees: `file` is non-empty,
/// `content` is `Some` exactly for create/update, and `patches` is empty
/// unless the action is patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    pub file: String,
    pub action: ChangeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<Patch>,
}

impl ChangeBlock {
    pub fn create(file: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            action: ChangeAction::Create,
            description: None,
            content: Some(content.into()),
            patches: Vec::new(),
        }
    }

    pub fn update(file: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Update,
            ..Self::create(file, content)
        }
    }

    pub fn patch(file: impl Into<String>, patches: Vec<Patch>) -> Self {
        Self {
            file: file.into(),
            action: ChangeAction::Patch,
            description: None,
            content: None,
            patches,
        }
    }

    pub fn delete(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            action: ChangeAction::Delete,
            description: None,
            content: None,
            patches: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of a definitive parse over a finished response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// Model rationale; diagnostic only.
    pub thinking: Option<String>,
    /// User-facing text.
    pub message: Option<String>,
    pub changes: Vec<ChangeBlock>,
    /// Blocks that were found but rejected, with the reason.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
