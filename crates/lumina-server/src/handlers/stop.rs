use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Serialize)]
struct StopResponse {
    success: bool,
    message: String,
}

pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let project_id = path.into_inner();
    log::info!("[{}] Stop request received", project_id);

    if !state.cancel_turn(&project_id).await {
        log::warn!("[{}] No running turn to stop", project_id);
        return Err(AppError::NotFound(format!(
            "No active generation for project {}",
            project_id
        )));
    }

    Ok(HttpResponse::Ok().json(StopResponse {
        success: true,
        message: "Generation stopped".to_string(),
    }))
}
