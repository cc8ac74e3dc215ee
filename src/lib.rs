//! Storage-room inventory backend.
//!
//! Shelves are allocated their containers on creation, binders are placed
//! on shelf coordinates, and customers can be bulk imported from CSV.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod import;
pub mod layout;
pub mod logging;
pub mod middleware_helpers;
pub mod services;
pub mod tracing;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use slog::Logger;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Upper bound on the time a single request may take
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub logger: Logger,
}

impl AppState {
    /// Wires the services for `db` from `config`.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig, logger: Logger) -> Self {
        let services = handlers::AppServices::new(db.clone(), &logger, &config);
        Self {
            db,
            config,
            services,
            logger,
        }
    }
}

// Common response wrappers
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// REST resources served under `/api/v1`
pub fn api_v1_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(api_index))
        .nest("/customers", handlers::customers::customers_routes())
        .nest("/shelves", handlers::shelves::shelves_routes())
        .nest("/binders", handlers::binders::binders_routes())
        .nest(
            "/uploads",
            handlers::uploads::uploads_routes(max_upload_bytes),
        )
}

/// The complete application: API, health endpoints and middleware stack.
pub fn build_router(state: AppState) -> Router {
    let logging_state = Arc::new(logging::LoggingState::new(state.logger.clone()));

    Router::new()
        .nest("/api/v1", api_v1_routes(state.config.max_upload_bytes))
        .nest("/health", health::health_routes(state.db.clone()))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(axum::middleware::from_fn_with_state(
            logging_state,
            logging::logging_middleware,
        ))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_index() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "resources": {
            "customers": "/api/v1/customers",
            "shelves": "/api/v1/shelves",
            "binders": "/api/v1/binders",
            "uploads": "/api/v1/uploads",
        },
    })))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}
