//! Snapshot delivery
//!
//! Defines the interface the tracker hands encoded snapshots to. Delivery is
//! fire-and-forget: implementations report failures, the tracker logs them
//! and moves on.

#[cfg(feature = "http")]
pub mod http_client;
pub mod wire;

use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;
use thiserror::Error;

pub use wire::{MetricsUpdate, RawSample, StoredMetrics, WireError, WireSnapshot};

#[cfg(feature = "http")]
pub use http_client::{HttpTransport, DEFAULT_PAGE_SIZE};

/// Errors that can occur while delivering or fetching metrics
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Wire format error: {0}")]
    Wire(#[from] WireError),

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Destination for encoded snapshots.
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    async fn deliver(&self, payload: &WireSnapshot) -> TransportResult<()>;
}

/// Transport that keeps delivered payloads in memory.
///
/// Clones share the same buffer, so a host can keep one handle and give the
/// other to a tracker.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    delivered: Arc<ParkingMutex<Vec<WireSnapshot>>>,
    failing: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every delivery.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<WireSnapshot> {
        self.delivered.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }
}

#[async_trait]
impl SnapshotTransport for MemoryTransport {
    async fn deliver(&self, payload: &WireSnapshot) -> TransportResult<()> {
        if self.failing {
            return Err(TransportError::Unavailable("memory transport set to fail".to_string()));
        }
        self.delivered.lock().push(payload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> WireSnapshot {
        WireSnapshot {
            application_id: 1,
            time_on_page: 3.0,
            buttons_clicked: "{}".to_string(),
            cursor_positions: "[]".to_string(),
            return_frequency: 0,
            page_views: 1,
            scroll_depth: 0.0,
        }
    }

    #[tokio::test]
    async fn test_memory_transport_shares_buffer() {
        let transport = MemoryTransport::new();
        let handle = transport.clone();

        transport.deliver(&payload()).await.unwrap();

        assert_eq!(handle.len(), 1);
        assert_eq!(handle.delivered()[0], payload());
    }

    #[tokio::test]
    async fn test_failing_transport() {
        let transport = MemoryTransport::failing();
        let err = transport.deliver(&payload()).await.unwrap_err();
        assert!(matches!(err, TransportError::Unavailable(_)));
        assert!(transport.is_empty());
    }
}
