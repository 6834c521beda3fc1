use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("bourbon_requests_total", "Total number of API requests").unwrap();
    pub static ref ADMITTED_TOTAL: Counter =
        register_counter!(
            "bourbon_admitted_total",
            "Requests admitted by the rate limiter"
        )
        .unwrap();
    pub static ref REJECTED_TOTAL: Counter =
        register_counter!(
            "bourbon_rejected_total",
            "Requests rejected by the rate limiter"
        )
        .unwrap();
    pub static ref TRACKED_KEYS: Gauge =
        register_gauge!(
            "bourbon_rate_limit_keys",
            "Keys currently held by the rate limiter"
        )
        .unwrap();
    pub static ref SMS_SENT: Counter =
        register_counter!("bourbon_sms_sent_total", "SMS messages delivered").unwrap();
    pub static ref SMS_FAILED: Counter =
        register_counter!(
            "bourbon_sms_failed_total",
            "SMS messages that failed to deliver"
        )
        .unwrap();
}
