use bourbon_club::config::Args;
use bourbon_club::handlers::router;
use bourbon_club::rate_limit::RateLimiter;
use bourbon_club::sms::{HttpSmsSender, LogSmsSender, SmsSender};
use bourbon_club::state::AppState;
use bourbon_club::sweeper::expired_entry_sweeper;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bourbon_club=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // parse cli arguments
    let args = Args::parse();
    args.validate()?;

    let sms: Arc<dyn SmsSender> = match &args.sms_gateway_url {
        Some(url) => Arc::new(HttpSmsSender::new(
            reqwest::Client::new(),
            url.clone(),
            args.sms_api_key.clone(),
            args.sms_from.clone(),
        )),
        None => {
            warn!("SMS_GATEWAY_URL not set, SMS messages will only be logged");
            Arc::new(LogSmsSender)
        }
    };

    let state = AppState::new(RateLimiter::new(), args.rate_limit_options(), sms);

    if let Some(every) = args.sweep_interval() {
        tokio::spawn(expired_entry_sweeper(state.clone(), every));
    }

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(port = args.port, "Bourbon Club service listening");
    info!(
        "Rate limit: {} requests per {} ms",
        args.rate_limit, args.rate_window_ms
    );

    axum::serve(listener, app).await?;
    Ok(())
}
