use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::warn;

use crate::constants::*;
use crate::error::SubscriptionError;
use crate::models::{
    CreateSubscriptionPayload, ListQuery, MessageResponse, Subscription, SubscriptionSummary,
    SummaryPayload, UpdateSubscriptionPayload,
};
use crate::service::SubscriptionService;
use crate::utils::parse_query_int;

type HandlerResult<T> = Result<T, SubscriptionError>;

fn body_error(handler: &'static str, rejection: JsonRejection) -> SubscriptionError {
    warn!(handler, error = %rejection, "Failed to parse request body");
    SubscriptionError::validation(format!("{}: {}", ERR_INVALID_BODY, rejection.body_text()))
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

pub async fn create_subscription(
    State(service): State<SubscriptionService>,
    payload: Result<Json<CreateSubscriptionPayload>, JsonRejection>,
) -> HandlerResult<(StatusCode, Json<Subscription>)> {
    let Json(payload) = payload.map_err(|e| body_error("create_subscription", e))?;
    let subscription = service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn get_subscription(
    State(service): State<SubscriptionService>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Subscription>> {
    Ok(Json(service.get(&id).await?))
}

pub async fn update_subscription(
    State(service): State<SubscriptionService>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSubscriptionPayload>, JsonRejection>,
) -> HandlerResult<Json<MessageResponse>> {
    let Json(payload) = payload.map_err(|e| body_error("update_subscription", e))?;
    service.update(&id, payload).await?;

    Ok(message(MSG_SUBSCRIPTION_UPDATED))
}

pub async fn delete_subscription(
    State(service): State<SubscriptionService>,
    Path(id): Path<String>,
) -> HandlerResult<Json<MessageResponse>> {
    service.delete(&id).await?;

    Ok(message(MSG_SUBSCRIPTION_DELETED))
}

pub async fn list_subscriptions(
    State(service): State<SubscriptionService>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Json<Vec<Subscription>>> {
    let page = parse_query_int(query.page.as_deref());
    let limit = parse_query_int(query.limit.as_deref());

    Ok(Json(service.list(page, limit).await?))
}

pub async fn get_summary(
    State(service): State<SubscriptionService>,
    payload: Result<Json<SummaryPayload>, JsonRejection>,
) -> HandlerResult<Json<SubscriptionSummary>> {
    let Json(payload) = payload.map_err(|e| body_error("get_summary", e))?;

    Ok(Json(service.summary(payload).await?))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
