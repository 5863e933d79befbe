use actix_web::http::header;
use actix_web::{web, HttpResponse};
use lumina_core::ChatRequest;
use lumina_llm::{stream_turn, ProviderAdapter};
use lumina_protocol::build_system_prompt;
use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::session::DEFAULT_PROJECT_ID;
use crate::state::AppState;
use crate::turn::{drive_turn, TurnEvent};

/// Start a chat turn and stream its events as SSE.
///
/// The turn runs on its own task; a client that disconnects stops receiving
/// events but the project still gets every change of the response.
pub async fn handler(state: web::Data<AppState>, req: web::Json<ChatRequest>) -> Result<HttpResponse> {
    let req = req.into_inner();
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }

    let project_id = req
        .project_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

    let settings = state.settings_snapshot().await;
    let system_prompt = build_system_prompt(&settings.system_instructions);
    let session = state.project(&project_id).await;
    let turn = state.begin_turn(&project_id).await;

    log::info!(
        "[{}] Chat turn {} started ({} history messages)",
        project_id,
        turn.id,
        req.history.len()
    );

    let events = stream_turn(
        ProviderAdapter::new(settings),
        req.conversation(),
        system_prompt,
        turn.cancel_token.clone(),
    );

    let (tx, mut rx) = mpsc::channel::<TurnEvent>(100);
    let state_clone = state.get_ref().clone();
    tokio::spawn(async move {
        let summary = drive_turn(&project_id, session, events, turn.cancel_token, tx).await;
        state_clone.end_turn(&project_id, turn.id).await;
        log::debug!("[{}] Turn {} summary: {:?}", project_id, turn.id, summary);
    });

    Ok(HttpResponse::Ok()
        .append_header((header::CONTENT_TYPE, "text/event-stream"))
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .append_header(("X-Accel-Buffering", "no"))
        .streaming(async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield Ok::<_, actix_web::Error>(web::Bytes::from(event.to_sse_frame()));
            }
        }))
}
