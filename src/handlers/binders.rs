use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::AuthenticatedAuthor,
    errors::ServiceError,
    services::{AttachmentInput, BinderInput},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct BinderListQuery {
    pub shelf_id: Option<Uuid>,
}

pub fn binders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_binders).post(create_binder))
        .route(
            "/:id",
            get(get_binder).put(update_binder).delete(delete_binder),
        )
        .route(
            "/:id/attachments",
            get(list_attachments).post(add_attachment),
        )
        .route(
            "/:id/attachments/:attachment_id",
            delete(remove_attachment),
        )
}

async fn list_binders(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Query(query): Query<BinderListQuery>,
) -> Result<Response, ServiceError> {
    let binders = state
        .services
        .binders
        .list(author.id(), query.shelf_id)
        .await?;
    Ok(success_response(binders))
}

async fn create_binder(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Json(payload): Json<BinderInput>,
) -> Result<Response, ServiceError> {
    let binder = state.services.binders.create(author.id(), payload).await?;
    Ok(created_response(binder))
}

async fn get_binder(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let binder = state.services.binders.get(author.id(), id).await?;
    Ok(success_response(binder))
}

async fn update_binder(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
    Json(payload): Json<BinderInput>,
) -> Result<Response, ServiceError> {
    let binder = state
        .services
        .binders
        .update(author.id(), id, payload)
        .await?;
    Ok(success_response(binder))
}

async fn delete_binder(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.binders.delete(author.id(), id).await?;
    Ok(no_content_response())
}

async fn list_attachments(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let attachments = state.services.binders.attachments(author.id(), id).await?;
    Ok(success_response(attachments))
}

async fn add_attachment(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentInput>,
) -> Result<Response, ServiceError> {
    let attachment = state
        .services
        .binders
        .add_attachment(author.id(), id, payload)
        .await?;
    Ok(created_response(attachment))
}

async fn remove_attachment(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ServiceError> {
    state
        .services
        .binders
        .remove_attachment(author.id(), id, attachment_id)
        .await?;
    Ok(no_content_response())
}
