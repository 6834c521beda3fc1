//! Admission limiting and SMS notifications for the Bourbon Club app.
//!
//! The club's request handlers are thin CRUD wrappers; the piece they share is
//! [`rate_limit::RateLimiter`], a process-local fixed-window limiter keyed by an
//! opaque string such as `password-reset:member@club.example`. This crate
//! serves it over HTTP alongside the SMS helper that callers compose with it.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod rate_limit;
pub mod sms;
pub mod state;
pub mod sweeper;
