use std::sync::Arc;

use holderflow::api::router::create_router;
use holderflow::bitquery::{BitqueryClient, RetryPolicy};
use holderflow::config::{AnalysisConfig, AppConfig};
use holderflow::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let analysis = AnalysisConfig::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = holderflow::metrics::init_metrics()?;

    if !config.has_bitquery_auth() {
        tracing::warn!("BITQUERY_API_KEY is not set, report requests will fail until it is configured");
    }

    let bitquery = BitqueryClient::new(
        reqwest::Client::new(),
        config.bitquery_endpoint.clone(),
        config.bitquery_api_key.clone(),
    )
    .with_retry_policy(RetryPolicy {
        max_retries: config.bitquery_max_retries,
        ..RetryPolicy::default()
    });

    tracing::info!(
        market_addresses = analysis.classifier.known_market_addresses.len(),
        tx_threshold = analysis.classifier.transaction_count_threshold,
        significant_volume_pct = %analysis.signal.significant_volume_percent,
        "Analysis configuration loaded"
    );

    let state = AppState {
        config,
        analysis: Arc::new(analysis),
        bitquery,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    // LOG_FORMAT=json for log shippers
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
