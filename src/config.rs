use clap::Parser;
use std::time::Duration;

use crate::rate_limit::RateLimitOptions;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "bourbon-club")]
#[command(about = "Admission limiting and SMS notifications for the Bourbon Club app")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Max admitted requests per key per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 3)]
    pub rate_limit: u32,

    // Window length in milliseconds (default one hour)
    #[arg(long, env = "RATE_WINDOW_MS", default_value_t = 3_600_000)]
    pub rate_window_ms: u64,

    // Purge expired limiter entries this often, 0 disables
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 0)]
    pub sweep_interval_secs: u64,

    // SMS gateway endpoint, messages are only logged when unset
    #[arg(long, env = "SMS_GATEWAY_URL")]
    pub sms_gateway_url: Option<String>,

    // Bearer token for the gateway, no Authorization header when unset
    #[arg(long, env = "SMS_API_KEY", hide_env_values = true)]
    pub sms_api_key: Option<String>,

    // Sender number shown to recipients
    #[arg(long, env = "SMS_FROM", default_value = "")]
    pub sms_from: String,
}

impl Args {
    pub fn rate_limit_options(&self) -> RateLimitOptions {
        RateLimitOptions::from_millis(self.rate_limit, self.rate_window_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit == 0 {
            return Err("--rate-limit must be positive".to_string());
        }
        if self.rate_window_ms == 0 {
            return Err("--rate-window-ms must be positive".to_string());
        }
        Ok(())
    }
}
