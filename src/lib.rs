pub mod api;
pub mod bitquery;
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod intelligence;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use crate::bitquery::BitqueryClient;
use crate::config::{AnalysisConfig, AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub analysis: Arc<AnalysisConfig>,
    pub bitquery: BitqueryClient,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
