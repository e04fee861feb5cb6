use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use thiserror::Error;

use crate::bitquery::{BitqueryError, TokenDataSource};
use crate::config::AnalysisConfig;
use crate::intelligence::{
    aggregate, classify_transfers, dedupe_transfers, filter_market_holders, filter_market_transfers,
    holder_activity, holder_ranks, within_window, AddressClassifier, AnalysisError,
};
use crate::models::{ClassifiedTransfer, Holder, HolderActivity, StatisticsReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] BitqueryError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Row limits applied to each query.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub holder_limit: u32,
    pub transfer_limit: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            holder_limit: 100,
            transfer_limit: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub contract: String,
    pub hours: u32,
    /// Only count transfers with a market address on one side.
    pub market_only: bool,
    /// List every windowed transfer instead of the analyzed ones.
    pub raw: bool,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub report: StatisticsReport,
    pub holder_activity: BTreeMap<String, HolderActivity>,
    /// Newest first.
    pub transactions: Vec<ClassifiedTransfer>,
    pub holders_analyzed: usize,
    pub transfers_analyzed: usize,
    pub filtered_holders: usize,
}

/// Run one fetch-then-analyze cycle:
/// 1. Fetch top holders; a missing list or no valid holder is invalid input
/// 2. Fetch transfers for those holders within the time range
/// 3. Dedupe sender-side and receiver-side results
/// 4. Drop holders that classify as market addresses
/// 5. Optionally keep only market transfers
/// 6. Aggregate statistics, the per-holder ledger and the transaction list
pub async fn run_analysis<S: TokenDataSource>(
    source: &S,
    request: &ReportRequest,
    config: &AnalysisConfig,
    limits: &PipelineConfig,
    now: DateTime<Utc>,
) -> Result<AnalysisOutcome, PipelineError> {
    let start = Instant::now();

    // Step 1: holders
    let fetched = source
        .fetch_top_holders(&request.contract, limits.holder_limit)
        .await?
        .ok_or_else(|| AnalysisError::InvalidInput("no valid holder data".into()))?;

    let holders: Vec<Holder> = fetched.into_iter().filter(|h| h.is_valid()).collect();
    if holders.is_empty() {
        return Err(AnalysisError::InvalidInput("no valid holder data".into()).into());
    }

    // Step 2: transfers in window
    let since = now - Duration::hours(i64::from(request.hours));
    let addresses: Vec<String> = holders.iter().map(|h| h.address.clone()).collect();
    let fetched = source
        .fetch_transfers(&addresses, &request.contract, since, limits.transfer_limit)
        .await?;

    // Step 3: merge both result sets
    let window = within_window(dedupe_transfers(fetched), since);

    // Steps 4 and 5: market holders out, optional market-only view
    let before = holders.len();
    let ranks = holder_ranks(&holders);
    let (holders, market_transfers, transactions) = {
        let classifier = AddressClassifier::new(&config.classifier, &window);
        let holders = filter_market_holders(holders, &classifier);
        let market = request
            .market_only
            .then(|| filter_market_transfers(&window, &classifier));
        let listed = match &market {
            Some(market) if !request.raw => market.as_slice(),
            _ => window.as_slice(),
        };
        let transactions = classify_transfers(listed, &classifier, &ranks);
        (holders, market, transactions)
    };
    let filtered_holders = before - holders.len();
    let transfers = market_transfers.unwrap_or(window);

    // Step 6: aggregate
    let report = aggregate(Some(&holders), &transfers, config)?;
    let activity = holder_activity(&holders, &transfers);

    counter!("reports_generated").increment(1);
    histogram!("analysis_latency_seconds").record(start.elapsed().as_secs_f64());

    tracing::info!(
        contract = %request.contract,
        hours = request.hours,
        market_only = request.market_only,
        holders = holders.len(),
        transfers = transfers.len(),
        filtered_holders,
        signal = %report.trading_signal.signal,
        "Report generated"
    );

    Ok(AnalysisOutcome {
        report,
        holder_activity: activity,
        transactions,
        holders_analyzed: holders.len(),
        transfers_analyzed: transfers.len(),
        filtered_holders,
    })
}
