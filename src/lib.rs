use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod month_year;
pub mod query;
pub mod request_log;
pub mod service;
pub mod store;
pub mod utils;

use service::SubscriptionService;

/// Full HTTP surface: subscription CRUD, the cost summary and a health check.
pub fn app(service: SubscriptionService) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/subscriptions",
            post(handlers::create_subscription).get(handlers::list_subscriptions),
        )
        .route(
            "/subscriptions/{id}",
            get(handlers::get_subscription)
                .put(handlers::update_subscription)
                .delete(handlers::delete_subscription),
        )
        .route("/summary", post(handlers::get_summary))
        .layer(request_log::request_trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(service)
}
