use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::AuthenticatedAuthor,
    errors::ServiceError,
    services::{CreateShelfInput, UpdateShelfInput},
    AppState,
};

pub fn shelves_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shelves).post(create_shelf))
        .route("/:id", get(get_shelf).put(update_shelf).delete(delete_shelf))
        .route("/:id/containers", get(list_containers))
}

async fn list_shelves(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
) -> Result<Response, ServiceError> {
    let shelves = state.services.shelves.list(author.id()).await?;
    Ok(success_response(shelves))
}

/// Creates the shelf together with its containers
async fn create_shelf(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Json(payload): Json<CreateShelfInput>,
) -> Result<Response, ServiceError> {
    let created = state.services.shelves.create(author.id(), payload).await?;
    Ok(created_response(created))
}

async fn get_shelf(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let detail = state.services.shelves.detail(author.id(), id).await?;
    Ok(success_response(detail))
}

async fn update_shelf(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShelfInput>,
) -> Result<Response, ServiceError> {
    let shelf = state
        .services
        .shelves
        .update(author.id(), id, payload)
        .await?;
    Ok(success_response(shelf))
}

async fn delete_shelf(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.shelves.delete(author.id(), id).await?;
    Ok(no_content_response())
}

async fn list_containers(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let containers = state.services.shelves.containers(author.id(), id).await?;
    Ok(success_response(containers))
}
