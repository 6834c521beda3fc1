mod admission;
mod health;
mod metrics;
mod notifications;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

pub use admission::rate_limit_check_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use notifications::sms_handler;

// Header carrying the requester identity resolved by the session layer
pub const REQUESTER_HEADER: &str = "x-requester";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/notifications/sms", post(sms_handler))
        .route("/api/rate-limit/check", post(rate_limit_check_handler))
        .with_state(state)
}
