use actix_web::{web, HttpResponse};
use lumina_core::SettingsUpdate;
use lumina_llm::ProviderAdapter;
use serde_json::json;

use crate::error::Result;
use crate::state::AppState;

/// Probe the provider with the saved settings, optionally overridden by the
/// request body so unsaved values can be tried first.
///
/// Probe failures are a normal result (`success: false`), not an HTTP error.
pub async fn handler(
    state: web::Data<AppState>,
    overrides: Option<web::Json<SettingsUpdate>>,
) -> Result<HttpResponse> {
    let mut settings = state.settings_snapshot().await;
    if let Some(overrides) = overrides {
        settings.apply_update(overrides.into_inner());
    }

    let adapter = ProviderAdapter::new(settings);
    match adapter.test_connection().await {
        Ok(result) => {
            log::info!("Connection test succeeded against {}", result.endpoint);
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": result.message,
                "model": result.model,
                "endpoint": result.endpoint,
            })))
        }
        Err(e) => {
            log::warn!("Connection test failed: {}", e);
            Ok(HttpResponse::Ok().json(json!({
                "success": false,
                "error": e.to_string(),
                "error_type": e.kind(),
                "endpoint": adapter.resolve_endpoint(),
            })))
        }
    }
}
