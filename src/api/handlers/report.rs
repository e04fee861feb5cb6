use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::ApiResponse;
use crate::bitquery::is_valid_address;
use crate::config::TIME_RANGES_HOURS;
use crate::errors::AppError;
use crate::ingestion::{run_analysis, AnalysisOutcome, PipelineConfig, ReportRequest};
use crate::models::normalize_address;
use crate::AppState;

const DEFAULT_HOURS: u32 = 24;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub hours: Option<u32>,
    /// Defaults to true: count only transfers touching a market address.
    pub market_only: Option<bool>,
    /// List all windowed transfers, not only the analyzed ones.
    pub raw: Option<bool>,
}

pub async fn token_report(
    State(state): State<AppState>,
    Path(contract): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, AppError> {
    let contract = normalize_address(&contract);
    if !is_valid_address(&contract) {
        return Err(AppError::BadRequest(format!("invalid contract address: {contract}")));
    }

    let hours = query.hours.unwrap_or(DEFAULT_HOURS);
    if !TIME_RANGES_HOURS.contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "unsupported time range {hours}h, expected one of {TIME_RANGES_HOURS:?}"
        )));
    }

    let request = ReportRequest {
        contract,
        hours,
        market_only: query.market_only.unwrap_or(true),
        raw: query.raw.unwrap_or(false),
    };
    let limits = PipelineConfig {
        holder_limit: state.config.holder_limit,
        transfer_limit: state.config.transfer_limit,
    };

    let outcome = run_analysis(&state.bitquery, &request, &state.analysis, &limits, Utc::now()).await?;

    Ok(Json(ApiResponse::ok(outcome)))
}
