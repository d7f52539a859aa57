pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
mod worker;

use axum::routing::{get, post};
use axum::{middleware, Router};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use upkeep_core::config::Config;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, config: Config) -> Router {
    let auth_state = auth::AuthState {
        token: config.server.token.clone(),
    };
    let app_state = state::AppState::new(root, config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::status::index))
        .route("/api/status", get(routes::status::get_status))
        .route(
            "/api/quick-issues",
            get(routes::issues::get_quick_issues).post(routes::issues::post_quick_issues),
        )
        .route(
            "/api/simple-project",
            get(routes::project_log::get_simple_project)
                .post(routes::project_log::post_simple_project),
        )
        .route(
            "/api/ui-style",
            get(routes::ui_style::get_ui_style).post(routes::ui_style::post_ui_style),
        )
        .route("/api/run", post(routes::jobs::run_action))
        .route("/api/jobs/{id}", get(routes::jobs::get_job))
        .route("/api/errors/clear", post(routes::jobs::clear_errors))
        .route("/logs/{filename}", get(routes::logs::get_log))
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth::auth_middleware,
        ))
        .layer(cors)
        .with_state(app_state)
}

/// Start the control panel server on the configured host and port.
pub async fn serve(root: PathBuf, config: Config) -> anyhow::Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let token_set = config.server.token.is_some();

    let app = build_router(root, config);
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let addr = listener.local_addr()?;

    tracing::info!("upkeep control panel listening on http://{addr}");
    if token_set {
        tracing::info!("token required ({})", auth::TOKEN_HEADER);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
