use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiResponse;
use crate::config::{AnalysisConfig, TIME_RANGES_HOURS};
use crate::AppState;

#[derive(Serialize)]
pub struct ConfigView {
    pub analysis: AnalysisConfig,
    pub time_ranges_hours: &'static [u32],
    pub holder_limit: u32,
    pub transfer_limit: u32,
}

/// Active thresholds and market address list.
pub async fn get_config(State(state): State<AppState>) -> Json<ApiResponse<ConfigView>> {
    Json(ApiResponse::ok(ConfigView {
        analysis: (*state.analysis).clone(),
        time_ranges_hours: TIME_RANGES_HOURS,
        holder_limit: state.config.holder_limit,
        transfer_limit: state.config.transfer_limit,
    }))
}
