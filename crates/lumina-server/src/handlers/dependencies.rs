use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let project_id = path.into_inner();
    let session = state
        .existing_project(&project_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Project not found: {}", project_id)))?;
    let dependencies = session.lock().await.dependencies();
    Ok(HttpResponse::Ok().json(json!({ "dependencies": dependencies })))
}
