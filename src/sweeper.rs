use std::sync::Arc;
use tokio::time::{Duration, interval};
use tracing::{debug, info};

use crate::metrics::TRACKED_KEYS;
use crate::state::AppState;

// Periodically drops limiter entries whose window has elapsed
pub async fn expired_entry_sweeper(state: Arc<AppState>, every: Duration) {
    let mut interval = interval(every);

    info!(?every, "rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = state.limiter.purge_expired();
        TRACKED_KEYS.set(state.limiter.len() as f64);

        if removed > 0 {
            debug!(removed, remaining = state.limiter.len(), "purged expired rate limit entries");
        }
    }
}
