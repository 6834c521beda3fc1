use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::REQUESTER_HEADER;
use crate::error::AppError;
use crate::metrics::{REQUEST_TOTAL, SMS_FAILED, SMS_SENT};
use crate::sms::{SmsDelivery, send_bulk};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SmsRequest {
    pub recipients: Vec<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct SmsResponse {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<SmsDelivery>,
}

pub(crate) fn requester(headers: &HeaderMap) -> String {
    headers
        .get(REQUESTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

// Admission is checked before any message goes out
pub async fn sms_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SmsRequest>,
) -> Result<Json<SmsResponse>, AppError> {
    REQUEST_TOTAL.inc();

    if payload.recipients.is_empty() {
        return Err(AppError::InvalidRequest("at least one recipient is required".to_string()));
    }
    if payload.recipients.iter().any(|r| r.trim().is_empty()) {
        return Err(AppError::InvalidRequest("recipients must not be blank".to_string()));
    }
    if payload.message.trim().is_empty() {
        return Err(AppError::InvalidRequest("message must not be blank".to_string()));
    }

    let requester = requester(&headers);
    state.admit(&format!("sms:{requester}"), state.rate_options)?;

    let results = send_bulk(state.sms.as_ref(), &payload.recipients, &payload.message).await;
    let sent = results.iter().filter(|r| r.success).count();
    let failed = results.len() - sent;

    SMS_SENT.inc_by(sent as f64);
    SMS_FAILED.inc_by(failed as f64);
    info!(requester = %requester, sent, failed, "SMS notification dispatched");

    Ok(Json(SmsResponse {
        sent,
        failed,
        results,
    }))
}
