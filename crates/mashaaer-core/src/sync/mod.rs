//! Best-effort push of recent timeline entries to a remote endpoint.
//!
//! Sync is gated on the `emotionExport` feature and an endpoint being
//! configured. Requests are fire-and-forget: failures are logged and the
//! next append-triggered sync sends a fresh window.

pub mod adapter;
pub mod client;
pub mod types;

pub use adapter::{SyncAdapter, SyncDispatch};
pub use client::{HttpTransport, SyncTransport};
pub use types::{SkipReason, SyncError, SyncPayload};
