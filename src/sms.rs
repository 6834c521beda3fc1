use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("SMS gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMS gateway rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a single text message to one destination.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), SmsError>;
}

// Outbound payload for the gateway
#[derive(Serialize)]
struct OutboundMessage<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

/// Sends through an HTTP SMS gateway that accepts `{to, from, body}` JSON.
pub struct HttpSmsSender {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpSmsSender {
    pub fn new(
        client: reqwest::Client,
        url: String,
        api_key: Option<String>,
        from: String,
    ) -> Self {
        Self {
            client,
            url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
        let mut req = self.client.post(&self.url).timeout(Duration::from_secs(10));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req
            .json(&OutboundMessage {
                to,
                from: &self.from,
                body,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Logs instead of sending. Used when no gateway is configured.
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
        info!(to, len = body.len(), "SMS gateway not configured, message logged only");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SmsDelivery {
    pub to: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends `body` to every recipient. One failed destination does not stop the rest.
pub async fn send_bulk(
    sender: &dyn SmsSender,
    recipients: &[String],
    body: &str,
) -> Vec<SmsDelivery> {
    let mut results = Vec::with_capacity(recipients.len());

    for to in recipients {
        let delivery = match sender.send(to, body).await {
            Ok(()) => SmsDelivery {
                to: to.clone(),
                success: true,
                error: None,
            },
            Err(e) => {
                warn!(to = %to, error = %e, "SMS delivery failed");
                SmsDelivery {
                    to: to.clone(),
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(delivery);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode, header::AUTHORIZATION},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    // What the stub gateway saw: Authorization header and JSON body
    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn stub_gateway(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(payload): Json<Value>,
    ) -> (StatusCode, String) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let to = payload["to"].as_str().unwrap_or_default().to_string();
        captured.lock().unwrap().push((auth, payload));

        match to.as_str() {
            "+15550400" => (StatusCode::BAD_REQUEST, "invalid number".to_string()),
            "+15550500" => (StatusCode::SERVICE_UNAVAILABLE, "gateway down".to_string()),
            _ => (StatusCode::ACCEPTED, "queued".to_string()),
        }
    }

    async fn spawn_gateway() -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/messages", post(stub_gateway))
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/messages"), captured)
    }

    fn http_sender(url: String, api_key: Option<&str>) -> HttpSmsSender {
        HttpSmsSender::new(
            reqwest::Client::new(),
            url,
            api_key.map(str::to_string),
            "+15559999".to_string(),
        )
    }

    #[tokio::test]
    async fn http_sender_posts_json_with_bearer_token() {
        let (url, captured) = spawn_gateway().await;
        let sender = http_sender(url, Some("club-secret"));

        sender.send("+15550001", "Tasting moved to 8pm").await.unwrap();

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let (auth, payload) = &captured[0];
        assert_eq!(auth.as_deref(), Some("Bearer club-secret"));
        assert_eq!(
            payload,
            &json!({ "to": "+15550001", "from": "+15559999", "body": "Tasting moved to 8pm" })
        );
    }

    #[tokio::test]
    async fn http_sender_omits_authorization_without_key() {
        let (url, captured) = spawn_gateway().await;
        let sender = http_sender(url, None);

        sender.send("+15550001", "hi").await.unwrap();

        assert!(captured.lock().unwrap()[0].0.is_none());
    }

    #[tokio::test]
    async fn http_sender_surfaces_gateway_rejections() {
        let (url, _) = spawn_gateway().await;
        let sender = http_sender(url, Some("club-secret"));

        match sender.send("+15550400", "hi").await {
            Err(SmsError::Rejected { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid number");
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        match sender.send("+15550500", "hi").await {
            Err(SmsError::Rejected { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "gateway down");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_sender_reports_unreachable_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let sender = http_sender(format!("http://{addr}/messages"), None);

        assert!(matches!(sender.send("+15550001", "hi").await, Err(SmsError::Http(_))));
    }

    // Records every send and fails for numbers in `failing`.
    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl SmsSender for Recorder {
        async fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
            self.sent.lock().unwrap().push((to.to_string(), body.to_string()));
            if self.failing.iter().any(|f| f == to) {
                return Err(SmsError::Rejected {
                    status: 400,
                    body: "invalid number".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn bulk_send_reports_each_destination() {
        let sender = Recorder {
            failing: vec!["+15550002".to_string()],
            ..Default::default()
        };
        let recipients = vec![
            "+15550001".to_string(),
            "+15550002".to_string(),
            "+15550003".to_string(),
        ];

        let results = send_bulk(&sender, &recipients, "Meeting moved to Friday").await;

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.as_deref().unwrap().contains("invalid number"));
        assert!(results[2].success);
        assert_eq!(sender.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let results = send_bulk(&LogSmsSender, &["+15550001".to_string()], "hi").await;
        assert!(results[0].success);
        assert!(results[0].error.is_none());
    }
}
