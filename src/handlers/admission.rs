use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::metrics::REQUEST_TOTAL;
use crate::rate_limit::{RateLimitOptions, RateLimitResult};
use crate::state::AppState;

// Omitted options fall back to the server's configured quota
#[derive(Deserialize)]
pub struct RateLimitCheckRequest {
    pub key: String,
    pub max_requests: Option<u32>,
    pub window_ms: Option<u64>,
}

impl RateLimitCheckRequest {
    fn options(&self, defaults: RateLimitOptions) -> Result<RateLimitOptions, AppError> {
        let max_requests = self.max_requests.unwrap_or(defaults.max_requests);
        let window_ms = self
            .window_ms
            .unwrap_or(defaults.window.as_millis() as u64);

        if max_requests == 0 || window_ms == 0 {
            return Err(AppError::InvalidRequest(
                "max_requests and window_ms must be positive".to_string(),
            ));
        }

        Ok(RateLimitOptions::from_millis(max_requests, window_ms))
    }
}

// Lets other club handlers consult the shared limiter, e.g. `sign-in:<email>`
pub async fn rate_limit_check_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RateLimitCheckRequest>,
) -> Result<Json<RateLimitResult>, AppError> {
    REQUEST_TOTAL.inc();

    if payload.key.trim().is_empty() {
        return Err(AppError::InvalidRequest("key must not be empty".to_string()));
    }
    let options = payload.options(state.rate_options)?;

    Ok(Json(state.check(&payload.key, options)))
}
