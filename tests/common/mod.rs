#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use shelves_api::{
    auth::AUTHOR_HEADER,
    config::AppConfig,
    db,
    logging::discard_logger,
    services::{CreateShelfInput, CustomerInput, ShelfWithContainers},
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub author: Uuid,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`], letting the test adjust the configuration first.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // every connection to sqlite::memory: is a separate database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg, discard_logger());
        let router = shelves_api::build_router(state.clone());

        Self {
            router,
            state,
            author: Uuid::new_v4(),
        }
    }

    /// Send a request as `author`, with an optional JSON body.
    pub async fn request_as(
        &self,
        author: Option<Uuid>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(author) = author {
            builder = builder.header(AUTHOR_HEADER, author.to_string());
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request as the default test author.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_as(Some(self.author), method, uri, body).await
    }

    /// POST raw bytes, as a CSV upload does.
    pub async fn post_raw(&self, uri: &str, bytes: &[u8]) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHOR_HEADER, self.author.to_string())
            .header("content-type", "text/csv")
            .body(Body::from(bytes.to_vec()))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn create_shelf(
        &self,
        code: &str,
        cols: Option<i32>,
        rows: Option<i32>,
        nums: Option<i32>,
    ) -> ShelfWithContainers {
        self.state
            .services
            .shelves
            .create(self.author, shelf_input(code, cols, rows, nums))
            .await
            .expect("shelf should be created")
    }

    pub async fn create_customer(&self, code: &str, name: &str) -> shelves_api::entities::customer::Model {
        self.state
            .services
            .customers
            .create(
                self.author,
                CustomerInput {
                    code: code.to_string(),
                    name: name.to_string(),
                    note: String::new(),
                },
            )
            .await
            .expect("customer should be created")
    }
}

pub fn shelf_input(
    code: &str,
    cols: Option<i32>,
    rows: Option<i32>,
    nums: Option<i32>,
) -> CreateShelfInput {
    CreateShelfInput {
        name: format!("Shelf {}", code),
        code: code.to_string(),
        desc: String::new(),
        cols,
        rows,
        nums,
    }
}

/// Read a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body should be JSON")
}
