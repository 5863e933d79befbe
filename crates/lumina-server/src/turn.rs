use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use lumina_core::events::sse_frame;
use lumina_core::StreamEvent;
use lumina_llm::EventStream;
use lumina_protocol::{apply_changes, parse_response, AppliedAction, AppliedChange, IncrementalParser};
use serde::Serialize;
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::session::ProjectSession;

/// Final-pass result sent after `complete`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangesPayload {
    pub message: Option<String>,
    pub changes: Vec<AppliedChange>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    Stream(StreamEvent),
    Changes(ChangesPayload),
}

impl TurnEvent {
    pub fn to_sse_frame(&self) -> String {
        match self {
            TurnEvent::Stream(event) => event.to_sse_frame(),
            TurnEvent::Changes(payload) => sse_frame("changes", &json!(payload)),
        }
    }
}

#[derive(Debug, Default)]
pub struct TurnSummary {
    pub events: usize,
    pub streamed_writes: usize,
    pub changes: Vec<AppliedChange>,
    pub cancelled: bool,
}

/// Drive one chat turn for a project.
///
/// Every relay event is forwarded to `tx` in order. Content is fed to an
/// incremental parser that writes closed create/update blocks to the store
/// as they arrive. After `complete` the full text is parsed again and every
/// block, including patch and delete, is applied; the outcome follows as a
/// `changes` event. A cancelled turn skips the final pass.
///
/// A closed receiver does not stop the turn, so the store always reaches the
/// state the response describes.
pub async fn drive_turn(
    project_id: &str,
    session: Arc<Mutex<ProjectSession>>,
    mut events: EventStream,
    cancel: CancellationToken,
    tx: mpsc::Sender<TurnEvent>,
) -> TurnSummary {
    let mut summary = TurnSummary::default();
    let mut parser = IncrementalParser::new();
    let mut streamed: HashMap<String, AppliedAction> = HashMap::new();
    let mut full_response: Option<String> = None;
    let mut receiver_gone = false;

    while let Some(event) = events.next().await {
        summary.events += 1;
        match &event {
            StreamEvent::Content { text } => {
                let mut session = session.lock().await;
                for applied in parser.push(text, session.store_mut()) {
                    log::debug!("[{}] Streamed {:?} {}", project_id, applied.action, applied.file);
                    streamed.entry(applied.file).or_insert(applied.action);
                    summary.streamed_writes += 1;
                }
            }
            StreamEvent::Complete { full_response: text } => {
                full_response = Some(text.clone());
            }
            StreamEvent::Error { error } => {
                log::warn!("[{}] Turn error: {}", project_id, error);
            }
            StreamEvent::Done { .. } => {}
        }
        forward(project_id, &tx, TurnEvent::Stream(event), &mut receiver_gone).await;
    }

    summary.cancelled = cancel.is_cancelled();
    let Some(text) = full_response else {
        return summary;
    };
    if summary.cancelled || text.trim().is_empty() {
        return summary;
    }

    let parsed = parse_response(&text);
    let (changes, dependencies) = {
        let mut session = session.lock().await;
        let mut changes = apply_changes(&parsed.changes, session.store_mut());
        for change in &mut changes {
            // a block first written mid-stream is reported as it was then
            if change.action == AppliedAction::Updated
                && streamed.get(&change.file) == Some(&AppliedAction::Created)
            {
                change.action = AppliedAction::Created;
            }
        }
        (changes, session.dependencies())
    };

    log::info!(
        "[{}] Turn finished: {} events, {} streamed writes, {} final changes",
        project_id,
        summary.events,
        summary.streamed_writes,
        changes.len()
    );

    summary.changes = changes.clone();
    let payload = ChangesPayload {
        message: parsed.message,
        changes,
        dependencies,
    };
    forward(project_id, &tx, TurnEvent::Changes(payload), &mut receiver_gone).await;
    summary
}

async fn forward(project_id: &str, tx: &mpsc::Sender<TurnEvent>, event: TurnEvent, receiver_gone: &mut bool) {
    if *receiver_gone {
        return;
    }
    if tx.send(event).await.is_err() {
        log::info!("[{}] Client disconnected, finishing turn without streaming", project_id);
        *receiver_gone = true;
    }
}
