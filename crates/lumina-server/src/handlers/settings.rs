use actix_web::{web, HttpResponse};
use lumina_core::SettingsUpdate;

use crate::error::Result;
use crate::state::AppState;

/// Current settings with the api key masked.
pub async fn get_settings(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.masked_settings().await))
}

/// Partial update. An empty `api_key` keeps the stored key.
pub async fn update_settings(
    state: web::Data<AppState>,
    req: web::Json<SettingsUpdate>,
) -> Result<HttpResponse> {
    let masked = state.update_settings(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(masked))
}
