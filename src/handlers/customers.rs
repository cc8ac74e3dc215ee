use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response};
use crate::{auth::AuthenticatedAuthor, errors::ServiceError, services::CustomerInput, AppState};

pub fn customers_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/by-code/:code", get(get_customer_by_code))
}

async fn list_customers(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
) -> Result<Response, ServiceError> {
    let customers = state.services.customers.list(author.id()).await?;
    Ok(success_response(customers))
}

async fn create_customer(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Json(payload): Json<CustomerInput>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.create(author.id(), payload).await?;
    Ok(created_response(customer))
}

async fn get_customer(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.get(author.id(), id).await?;
    Ok(success_response(customer))
}

async fn get_customer_by_code(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(code): Path<String>,
) -> Result<Response, ServiceError> {
    let customer = state
        .services
        .customers
        .get_by_code(author.id(), &code)
        .await?;
    Ok(success_response(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerInput>,
) -> Result<Response, ServiceError> {
    let customer = state
        .services
        .customers
        .update(author.id(), id, payload)
        .await?;
    Ok(success_response(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    author: AuthenticatedAuthor,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.customers.delete(author.id(), id).await?;
    Ok(no_content_response())
}
