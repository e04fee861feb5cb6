use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use super::queries::{top_holders_query, transfers_query};
use super::types::{EvmData, GraphQlResponse};
use crate::models::{Holder, Transfer};

const RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);
const FAILED_DEPENDENCY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum BitqueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bitquery API key is not configured")]
    MissingApiKey,

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Source of holder snapshots and transfer windows.
pub trait TokenDataSource {
    /// `Ok(None)` when the response carried no holder list at all.
    fn fetch_top_holders(
        &self,
        contract: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Option<Vec<Holder>>, BitqueryError>> + Send;

    /// Transfers sent or received by any of `addresses` since `since`.
    fn fetch_transfers(
        &self,
        addresses: &[String],
        contract: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Transfer>, BitqueryError>> + Send;
}

/// Waits applied before retrying throttled or temporarily failing requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub rate_limit_delay: Duration,
    pub failed_dependency_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_delay: RATE_LIMIT_DELAY,
            failed_dependency_delay: FAILED_DEPENDENCY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, or None if `status` is not retryable.
    fn delay_for(&self, status: StatusCode) -> Option<Duration> {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Some(self.rate_limit_delay),
            StatusCode::FAILED_DEPENDENCY => Some(self.failed_dependency_delay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BitqueryClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl BitqueryClient {
    pub fn new(http: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST one GraphQL document, retrying on 429 and 424.
    async fn post_query<T: DeserializeOwned>(&self, query: String) -> Result<T, BitqueryError> {
        let api_key = self.api_key.as_deref().ok_or(BitqueryError::MissingApiKey)?;
        let body = json!({ "query": query });
        let mut attempt = 0u32;

        loop {
            metrics::counter!("bitquery_requests_total").increment(1);

            let resp = self
                .http
                .post(&self.endpoint)
                .header("X-API-KEY", api_key)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if let Some(delay) = self.retry.delay_for(status) {
                if attempt < self.retry.max_retries {
                    attempt += 1;
                    metrics::counter!("bitquery_retries_total").increment(1);
                    tracing::warn!(
                        status = %status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Bitquery request throttled, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            let envelope: GraphQlResponse<T> = resp.error_for_status()?.json().await?;

            if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
                let detail = serde_json::to_string(&errors).unwrap_or_else(|_| "unknown".into());
                return Err(BitqueryError::GraphQl(detail));
            }

            return envelope
                .data
                .ok_or_else(|| BitqueryError::Unexpected("response has no data".into()));
        }
    }
}

impl TokenDataSource for BitqueryClient {
    async fn fetch_top_holders(
        &self,
        contract: &str,
        limit: u32,
    ) -> Result<Option<Vec<Holder>>, BitqueryError> {
        let query = top_holders_query(contract, Utc::now().date_naive(), limit);
        let data: EvmData = self.post_query(query).await?;

        let Some(raw) = data.evm.and_then(|evm| evm.token_holders) else {
            return Ok(None);
        };

        let total = raw.len();
        let holders: Vec<Holder> = raw.into_iter().filter_map(|h| h.into_holder()).collect();
        tracing::debug!(total, kept = holders.len(), "Fetched top holders");

        Ok(Some(holders))
    }

    async fn fetch_transfers(
        &self,
        addresses: &[String],
        contract: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Transfer>, BitqueryError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let query = transfers_query(addresses, contract, since, limit);
        let data: EvmData = self.post_query(query).await?;
        let evm = data.evm.unwrap_or_default();

        let transfers: Vec<Transfer> = evm
            .transfers
            .unwrap_or_default()
            .into_iter()
            .chain(evm.receiving_transfers.unwrap_or_default())
            .filter_map(|t| t.into_transfer())
            .collect();

        tracing::debug!(count = transfers.len(), "Fetched transfers");
        Ok(transfers)
    }
}
