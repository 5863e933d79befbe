use actix_web::{web, HttpResponse};
use lumina_vfs::Snapshot;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub files: Snapshot,
}

/// Snapshot pull for the preview. Unknown projects are not created here.
pub async fn get_files(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let project_id = path.into_inner();
    let session = state
        .existing_project(&project_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Project not found: {}", project_id)))?;
    let snapshot = session.lock().await.snapshot();
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Snapshot push: replaces every file in the project.
pub async fn put_files(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ImportRequest>,
) -> Result<HttpResponse> {
    let project_id = path.into_inner();
    let files = req.into_inner().files;
    log::info!("[{}] Importing {} files", project_id, files.len());

    let session = state.project(&project_id).await;
    let snapshot = session.lock().await.import(files);
    Ok(HttpResponse::Ok().json(snapshot))
}
