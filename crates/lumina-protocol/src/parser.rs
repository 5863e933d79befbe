use crate::change::{ChangeAction, ChangeBlock, ParsedResponse, Patch};
use crate::scan::{element, elements, inner, text_of, verbatim_of};

/// Definitive parse of a finished response.
///
/// Without a closed `<response>` container the text is scanned for bare
/// change blocks; if none exist the whole text becomes the message.
pub fn parse_response(text: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();

    let container = element(text, "response");
    let body = match container {
        Some(el) => {
            let body = inner(text, &el);
            parsed.thinking = text_of(body, "thinking");
            parsed.message = text_of(body, "message");
            body
        }
        None => {
            log::debug!("No <response> container found, scanning for bare change blocks");
            text
        }
    };

    let (changes, warnings) = collect_changes(body);
    parsed.changes = changes;
    parsed.warnings = warnings;

    if container.is_none() {
        parsed.message = text_of(text, "message");
        if parsed.message.is_none() && parsed.changes.is_empty() {
            parsed.message = Some(text.to_string());
        }
    }

    for warning in &parsed.warnings {
        log::warn!("{}", warning);
    }

    parsed
}

/// Every valid change block in `text`, in document order.
pub fn extract_changes(text: &str) -> Vec<ChangeBlock> {
    collect_changes(text).0
}

fn collect_changes(text: &str) -> (Vec<ChangeBlock>, Vec<String>) {
    let mut changes = Vec::new();
    let mut warnings = Vec::new();

    for el in elements(text, "change") {
        match parse_change_block(inner(text, &el)) {
            Ok(change) => changes.push(change),
            Err(reason) => warnings.push(reason),
        }
    }

    (changes, warnings)
}

/// Validate and build one block from the body of a `<change>` element.
pub(crate) fn parse_change_block(body: &str) -> Result<ChangeBlock, String> {
    let file = text_of(body, "file")
        .filter(|f| !f.is_empty())
        .ok_or_else(|| "Discarding change block without a file path".to_string())?;

    let action = text_of(body, "action")
        .map(|a| ChangeAction::parse_lenient(&a))
        .unwrap_or_default();

    let description = text_of(body, "description").filter(|d| !d.is_empty());

    let (content, patches) = match action {
        ChangeAction::Create | ChangeAction::Update => {
            let content = verbatim_of(body, "content").ok_or_else(|| {
                format!("Discarding {:?} block for {} without content", action, file)
            })?;
            (Some(content), Vec::new())
        }
        ChangeAction::Patch => (None, extract_patches(body)),
        ChangeAction::Delete => (None, Vec::new()),
    };

    Ok(ChangeBlock {
        file,
        action,
        description,
        content,
        patches,
    })
}

/// `<patch>` pairs with both a find and a replace region; others are dropped.
fn extract_patches(body: &str) -> Vec<Patch> {
    elements(body, "patch")
        .iter()
        .filter_map(|el| {
            let patch_body = inner(body, el);
            let find = verbatim_of(patch_body, "find");
            let replace = verbatim_of(patch_body, "replace");
            match (find, replace) {
                (Some(find), Some(replace)) => Some(Patch { find, replace }),
                _ => {
                    log::warn!("Dropping <patch> without both <find> and <replace>");
                    None
                }
            }
        })
        .collect()
}
