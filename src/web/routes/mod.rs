//! Contains all the routes that this application can handle.

mod home;
mod subscribe;

pub use subscribe::SubscribeOutcome;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::{store::SubscriptionStore, AppState};
use home::home;
use subscribe::{invalid_method, subscribe};

pub const SUBSCRIBE_PATH: &str = "/subscribe-ajax/";

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes<S: SubscriptionStore>(app_state: AppState<S>) -> Router {
    // Only POST subscribes, every other method gets the same "Invalid request" answer.
    let subscribe_route = post(subscribe::<S>).fallback(invalid_method);

    Router::new()
        .route("/", get(home::<S>))
        .route(SUBSCRIBE_PATH, subscribe_route.clone())
        .route(SUBSCRIBE_PATH.trim_end_matches('/'), subscribe_route)
        .with_state(app_state)
        .route("/health-check", get(health_check))
}
