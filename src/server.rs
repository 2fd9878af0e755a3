//! HTTP server setup.
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use log::*;
use serde_json::json;
use std::sync::Arc;

use crate::{
    Result,
    auth::FileSessionStore,
    config::Config,
    forge::factory::GithubFactory,
    handlers::{self, AppState},
};

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the shared state from configuration.
pub fn app_state(config: &Config) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        config.limits.clone(),
        Arc::new(FileSessionStore::new(&config.sessions.path)),
        Arc::new(GithubFactory::new(config.github.clone())),
    ))
}

/// Serve until the process is stopped.
pub async fn run(config: Config) -> Result<()> {
    let state = app_state(&config);
    let json_limit = config.limits.json_body_limit;
    let address = config.bind_address();

    info!(
        "listening on {}:{} (github: {}, sessions: {})",
        address.0, address.1, config.github.api_url, config.sessions.path
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(handlers::json_config(json_limit))
            .wrap(handlers::cors())
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health))
            .configure(handlers::configure_routes)
    })
    .bind(address)?
    .run()
    .await?;

    info!("server stopped");

    Ok(())
}
