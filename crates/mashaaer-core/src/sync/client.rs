//! HTTP transport for sync requests.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::sync::types::{SyncError, SyncPayload};

/// Delivers a sync payload somewhere and returns the parsed reply.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn post(&self, endpoint: &Url, payload: &SyncPayload) -> Result<serde_json::Value, SyncError>;
}

/// JSON-over-HTTP transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn post(&self, endpoint: &Url, payload: &SyncPayload) -> Result<serde_json::Value, SyncError> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineStats;
    use chrono::Utc;

    fn payload() -> SyncPayload {
        SyncPayload {
            entries: vec![crate::emotion::EmotionEntry::observed("happy".into(), 0.8)],
            stats: TimelineStats::default(),
            last_updated: Utc::now(),
            cultural_context: "neutral".into(),
        }
    }

    #[tokio::test]
    async fn posts_json_and_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/emotion-timeline")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"culturalContext":"neutral"}"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let endpoint = Url::parse(&format!("{}/api/emotion-timeline", server.url())).unwrap();
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let reply = transport.post(&endpoint, &payload()).await.unwrap();

        assert_eq!(reply["status"], "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_maps_to_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/sync")
            .with_status(503)
            .create_async()
            .await;

        let endpoint = Url::parse(&format!("{}/sync", server.url())).unwrap();
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport.post(&endpoint, &payload()).await.unwrap_err();

        assert!(matches!(err, SyncError::Http { status: 503 }), "{err:?}");
    }

    #[tokio::test]
    async fn non_json_reply_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/sync")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let endpoint = Url::parse(&format!("{}/sync", server.url())).unwrap();
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport.post(&endpoint, &payload()).await.unwrap_err();

        assert!(matches!(err, SyncError::Decode(_)), "{err:?}");
    }
}
