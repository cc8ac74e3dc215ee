use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::common::{created_response, success_response};
use crate::{auth::AuthenticatedAuthor, errors::ServiceError, AppState};

const DEFAULT_FILE_NAME: &str = "upload.csv";

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub file_name: Option<String>,
}

/// CSV customer imports. The request body is the raw file; bodies larger
/// than `max_upload_bytes` are refused before reaching the importer.
pub fn uploads_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_uploads).post(import_customers))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn list_uploads(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
) -> Result<Response, ServiceError> {
    let uploads = state.services.imports.uploads(author.id()).await?;
    Ok(success_response(uploads))
}

async fn import_customers(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let file_name = query
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let report = state
        .services
        .imports
        .import(author.id(), &file_name, &body)
        .await?;
    Ok(created_response(report))
}
