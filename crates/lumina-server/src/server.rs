use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;

use crate::handlers;
use crate::state::AppState;

/// Route table under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/chat", web::post().to(handlers::chat::handler))
            .route("/stop/{project_id}", web::post().to(handlers::stop::handler))
            .route(
                "/test-connection",
                web::post().to(handlers::test_connection::handler),
            )
            .route("/settings", web::get().to(handlers::settings::get_settings))
            .route("/settings", web::post().to(handlers::settings::update_settings))
            .route(
                "/projects/{project_id}/files",
                web::get().to(handlers::files::get_files),
            )
            .route(
                "/projects/{project_id}/files",
                web::put().to(handlers::files::put_files),
            )
            .route(
                "/projects/{project_id}/dependencies",
                web::get().to(handlers::dependencies::handler),
            )
            .route("/health", web::get().to(handlers::health::handler)),
    );
}

pub async fn run_server(port: u16, state: AppState) -> io::Result<()> {
    let state = web::Data::new(state);

    log::info!("Starting server on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .wrap(Cors::permissive())
            .configure(configure)
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
