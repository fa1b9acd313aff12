//! HTTP transport over the backend's behavior-metrics endpoints.
//!
//! No retry: a failed delivery is reported once and the snapshot is dropped.

use super::wire::{MetricsUpdate, StoredMetrics, WireSnapshot};
use super::{SnapshotTransport, TransportError, TransportResult};
use crate::config::TransportConfig;
use crate::stats::AggregateStatistics;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

const METRICS_PATH: &str = "/behavior-metrics";

/// Page size the backend uses when `limit` is omitted.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Collection endpoint used for `POST`.
    pub fn metrics_url(&self) -> String {
        let url = endpoint(&self.config.base_url, METRICS_PATH);
        if self.config.trailing_slash {
            format!("{}/", url)
        } else {
            url
        }
    }

    pub fn summary_url(&self) -> String {
        endpoint(&self.config.base_url, &format!("{}/statistics/summary", METRICS_PATH))
    }

    pub fn application_url(&self, application_id: i64) -> String {
        endpoint(
            &self.config.base_url,
            &format!("{}/application/{}", METRICS_PATH, application_id),
        )
    }

    pub fn record_url(&self, metrics_id: i64) -> String {
        endpoint(&self.config.base_url, &format!("{}/{}", METRICS_PATH, metrics_id))
    }

    /// Store a snapshot and return the created record.
    pub async fn post_snapshot(&self, payload: &WireSnapshot) -> TransportResult<StoredMetrics> {
        let response = self
            .client
            .post(self.metrics_url())
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    pub async fn fetch_summary(&self) -> TransportResult<AggregateStatistics> {
        let response = self
            .client
            .get(self.summary_url())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    pub async fn fetch_by_application(&self, application_id: i64) -> TransportResult<StoredMetrics> {
        let response = self
            .client
            .get(self.application_url(application_id))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    pub async fn update_by_application(
        &self,
        application_id: i64,
        update: &MetricsUpdate,
    ) -> TransportResult<StoredMetrics> {
        let response = self
            .client
            .put(self.application_url(application_id))
            .json(update)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    /// One page of stored records, oldest first.
    pub async fn list_records(&self, skip: u32, limit: u32) -> TransportResult<Vec<StoredMetrics>> {
        let response = self
            .client
            .get(self.metrics_url())
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    /// Walk the collection page by page until a short page comes back.
    pub async fn fetch_all_records(&self, page_size: u32) -> TransportResult<Vec<StoredMetrics>> {
        let page_size = page_size.max(1);
        let mut records = Vec::new();
        let mut skip = 0;

        loop {
            let page = self.list_records(skip, page_size).await?;
            let fetched = page.len();
            records.extend(page);
            if is_last_page(fetched, page_size) {
                break;
            }
            skip += page_size;
        }

        tracing::debug!("Fetched {} behavior metrics records", records.len());
        Ok(records)
    }

    pub async fn fetch_record(&self, metrics_id: i64) -> TransportResult<StoredMetrics> {
        let response = self
            .client
            .get(self.record_url(metrics_id))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    pub async fn update_record(
        &self,
        metrics_id: i64,
        update: &MetricsUpdate,
    ) -> TransportResult<StoredMetrics> {
        let response = self
            .client
            .put(self.record_url(metrics_id))
            .json(update)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        read_json(response).await
    }

    /// Delete a stored record. The backend answers 204 with no body.
    pub async fn delete_record(&self, metrics_id: i64) -> TransportResult<()> {
        let response = self
            .client
            .delete(self.record_url(metrics_id))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotTransport for HttpTransport {
    async fn deliver(&self, payload: &WireSnapshot) -> TransportResult<()> {
        let stored = self.post_snapshot(payload).await?;
        tracing::debug!("Behavior metrics stored as record {}", stored.id);
        Ok(())
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn is_last_page(fetched: usize, page_size: u32) -> bool {
    fetched < page_size as usize
}

async fn check_status(response: reqwest::Response) -> TransportResult<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> TransportResult<T> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}
