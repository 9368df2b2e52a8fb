//! Decides whether a sync round runs and dispatches it.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

use crate::access::{AccessGate, Feature};
use crate::storage::Config;
use crate::sync::client::{HttpTransport, SyncTransport};
use crate::sync::types::{SkipReason, SyncError, SyncPayload};
use crate::timeline::TimelineDocument;

/// Result of asking for a sync round.
pub enum SyncDispatch {
    /// A request is in flight. Awaiting the handle is optional.
    Dispatched {
        entry_count: usize,
        handle: JoinHandle<Result<serde_json::Value, SyncError>>,
    },
    Skipped(SkipReason),
}

impl SyncDispatch {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, SyncDispatch::Dispatched { .. })
    }

    /// Wait for the in-flight request, if any.
    pub async fn wait(self) -> Option<Result<serde_json::Value, SyncError>> {
        match self {
            SyncDispatch::Dispatched { handle, .. } => match handle.await {
                Ok(result) => Some(result),
                Err(e) => Some(Err(SyncError::Network(format!("sync task failed: {e}")))),
            },
            SyncDispatch::Skipped(_) => None,
        }
    }
}

pub struct SyncAdapter {
    endpoint: Option<Url>,
    window: usize,
    cultural_context: String,
    transport: Arc<dyn SyncTransport>,
}

impl SyncAdapter {
    pub fn new(endpoint: Option<Url>, transport: Arc<dyn SyncTransport>) -> Self {
        Self {
            endpoint,
            window: 50,
            cultural_context: "neutral".into(),
            transport,
        }
    }

    /// HTTP adapter from configuration.
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        let endpoint = config
            .api_endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| SyncError::InvalidEndpoint {
                    endpoint: raw.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;
        let transport = HttpTransport::new(Duration::from_secs(config.sync.timeout_secs))?;

        Ok(Self::new(endpoint, Arc::new(transport))
            .with_window(config.sync.window)
            .with_cultural_context(&config.cultural_context))
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_cultural_context(mut self, context: &str) -> Self {
        self.cultural_context = context.to_string();
        self
    }

    pub fn set_cultural_context(&mut self, context: &str) {
        self.cultural_context = context.to_string();
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Most recent window of entries plus full stats.
    pub fn build_payload(&self, doc: &TimelineDocument) -> SyncPayload {
        SyncPayload {
            entries: doc.recent(self.window).to_vec(),
            stats: doc.stats.clone(),
            last_updated: doc.last_updated,
            cultural_context: self.cultural_context.clone(),
        }
    }

    /// Start a sync round if an endpoint is set and the tier allows export.
    ///
    /// Never blocks; the request runs on the current tokio runtime.
    pub fn sync_with_server(&self, doc: &TimelineDocument, gate: &AccessGate) -> SyncDispatch {
        let Some(endpoint) = self.endpoint.clone() else {
            return SyncDispatch::Skipped(SkipReason::NoEndpoint);
        };
        if !gate.allows(Feature::EmotionExport) {
            return SyncDispatch::Skipped(SkipReason::NotEntitled);
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("Skipping timeline sync: no tokio runtime");
            return SyncDispatch::Skipped(SkipReason::NoRuntime);
        };

        let payload = self.build_payload(doc);
        let entry_count = payload.entries.len();
        let transport = Arc::clone(&self.transport);

        tracing::debug!(%endpoint, entry_count, "Dispatching timeline sync");
        let handle = runtime.spawn(async move {
            let started = Utc::now();
            let result = transport.post(&endpoint, &payload).await;
            match &result {
                Ok(reply) => tracing::info!(
                    %endpoint,
                    entry_count,
                    elapsed_ms = (Utc::now() - started).num_milliseconds(),
                    reply = %reply,
                    "Emotion timeline synced with server"
                ),
                Err(e) => tracing::error!(%endpoint, error = %e, "Error syncing emotion timeline with server"),
            }
            result
        });

        SyncDispatch::Dispatched { entry_count, handle }
    }
}
