use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use holderflow::bitquery::{BitqueryClient, RetryPolicy};
use holderflow::config::{AnalysisConfig, AppConfig};
use holderflow::models::{Holder, Transfer};
use holderflow::AppState;

pub const CONTRACT: &str = "0x00000000000000000000000000000000000000aa";
pub const ALICE: &str = "0x1111111111111111111111111111111111111111";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";
pub const CAROL: &str = "0x3333333333333333333333333333333333333333";
/// Uniswap V2 Router, part of the default market list.
pub const ROUTER: &str = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";

/// Fixed reference time so windows are deterministic.
#[allow(dead_code)]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn holder(address: &str, balance: i64) -> Holder {
    Holder::new(address, Decimal::from(balance), "TKN")
}

/// A transfer `minutes_ago` before [`now`].
#[allow(dead_code)]
pub fn transfer(minutes_ago: i64, amount: i64, sender: &str, receiver: &str) -> Transfer {
    Transfer {
        timestamp: now() - Duration::minutes(minutes_ago),
        amount: Decimal::from(amount),
        sender: sender.into(),
        receiver: receiver.into(),
        currency_symbol: "TKN".into(),
    }
}

#[allow(dead_code)]
pub fn test_config(api_token: Option<&str>, api_key: Option<&str>, endpoint: &str) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        api_token: api_token.map(String::from),
        bitquery_api_key: api_key.map(String::from),
        bitquery_endpoint: endpoint.into(),
        bitquery_max_retries: 2,
        holder_limit: 100,
        transfer_limit: 100,
    }
}

/// App state wired to `config`, with millisecond retry waits.
#[allow(dead_code)]
pub fn build_state(config: AppConfig) -> AppState {
    let retry = RetryPolicy {
        max_retries: config.bitquery_max_retries,
        rate_limit_delay: StdDuration::from_millis(10),
        failed_dependency_delay: StdDuration::from_millis(10),
    };
    let bitquery = BitqueryClient::new(
        reqwest::Client::new(),
        config.bitquery_endpoint.clone(),
        config.bitquery_api_key.clone(),
    )
    .with_retry_policy(retry);

    AppState {
        config,
        analysis: Arc::new(AnalysisConfig::with_default_addresses()),
        bitquery,
        metrics_handle: holderflow::metrics::detached_handle(),
    }
}

// ---------------------------------------------------------------------------
// Mock Bitquery endpoint
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct MockBitquery {
    holders: Value,
    transfers: Value,
    /// Requests answered with `throttle_status` before real data is served.
    throttle_remaining: Arc<AtomicUsize>,
    throttle_status: StatusCode,
    hits: Arc<AtomicUsize>,
}

async fn graphql(State(mock): State<MockBitquery>, Json(body): Json<Value>) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);

    let throttled = mock
        .throttle_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if throttled {
        return mock.throttle_status.into_response();
    }

    let query = body["query"].as_str().unwrap_or_default();
    let data = if query.contains("TokenHolders") {
        json!({ "EVM": { "TokenHolders": mock.holders } })
    } else {
        json!({ "EVM": { "Transfers": mock.transfers, "ReceivingTransfers": [] } })
    };
    Json(json!({ "data": data })).into_response()
}

/// Serve canned GraphQL responses on an ephemeral port, answering the
/// first `throttle` requests with 429.
///
/// Returns the endpoint URL and a hit counter.
#[allow(dead_code)]
pub async fn spawn_mock_bitquery(holders: Value, transfers: Value, throttle: usize) -> (String, Arc<AtomicUsize>) {
    spawn_mock_bitquery_with_status(holders, transfers, throttle, StatusCode::TOO_MANY_REQUESTS).await
}

/// Like [`spawn_mock_bitquery`] with a custom status for the failing requests.
#[allow(dead_code)]
pub async fn spawn_mock_bitquery_with_status(
    holders: Value,
    transfers: Value,
    throttle: usize,
    throttle_status: StatusCode,
) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let mock = MockBitquery {
        holders,
        transfers,
        throttle_remaining: Arc::new(AtomicUsize::new(throttle)),
        throttle_status,
        hits: hits.clone(),
    };

    let app = Router::new().route("/graphql", post(graphql)).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock listener");
    let addr = listener.local_addr().expect("Mock listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{addr}/graphql"), hits)
}

/// Bitquery-shaped holder row.
#[allow(dead_code)]
pub fn api_holder(address: &str, amount: &str) -> Value {
    json!({
        "Balance": { "Amount": amount },
        "Holder": { "Address": address },
        "Currency": { "Name": "Test Token", "Symbol": "TKN" }
    })
}

/// Bitquery-shaped transfer row, timed relative to the wall clock.
#[allow(dead_code)]
pub fn api_transfer(minutes_ago: i64, amount: &str, sender: &str, receiver: &str) -> Value {
    let time = (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339();
    json!({
        "Block": { "Time": time },
        "Transfer": {
            "Amount": amount,
            "Sender": sender,
            "Receiver": receiver,
            "Currency": { "Symbol": "TKN" }
        }
    })
}
