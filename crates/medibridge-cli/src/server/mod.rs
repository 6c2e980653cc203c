//! HTTP surface: save records, upload files, and the read-through lookups.

mod error;
mod lookups;
mod records;
mod state;
mod upload;

pub use state::AppState;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use medibridge_core::config::BridgeConfig;
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: AppState, cfg: &BridgeConfig) -> Router {
    let mut app = Router::new()
        .route("/guardar", post(records::save_records))
        .route(
            "/api/archivos/copiar",
            post(upload::copy_file).layer(DefaultBodyLimit::max(cfg.max_upload_bytes)),
        )
        .route("/api/capbas/get/:tipo_documento/:numero", get(lookups::capbas))
        .route("/api/ingresos/get/:hisckey/:histipdoc", get(lookups::ingresos))
        .route(
            "/api/hccom/v2/booking/:histipdoc/:hisckey/:ingresos/:sede/:valor",
            get(lookups::booking),
        )
        .route("/api/imahc/get/:s1codima", get(lookups::imahc))
        .route("/api/hiscsec/:hisckey", get(lookups::hiscsec))
        .with_state(state);

    if let Some(dir) = &cfg.frontend_dir {
        app = app
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/static", ServeDir::new(dir));
    }

    with_layers(app)
}

/// Panic recovery, request tracing and permissive CORS, outermost last.
pub(crate) fn with_layers(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
}

/// Any handler panic becomes a generic 500; the process keeps serving.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let msg = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = msg, "request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "internal server error" })),
    )
        .into_response()
}

pub async fn serve(cfg: &BridgeConfig, addr: &str) -> Result<()> {
    let state = AppState::from_config(cfg)?;
    let app = router(state, cfg);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    tracing::info!("medibridge listening on {}", listener.local_addr()?);
    tracing::info!("upstream: {}", cfg.medihelp_base_url);
    tracing::info!("default PDF destination: {}", cfg.pdf_dest_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler failed: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
