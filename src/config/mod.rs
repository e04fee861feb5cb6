use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::intelligence::classifier::ClassifierConfig;
use crate::intelligence::signal::SignalConfig;

const DEFAULT_BITQUERY_ENDPOINT: &str = "https://streaming.bitquery.io/graphql";

/// Routers and pools treated as market addresses unless `MARKET_ADDRESSES` is set.
pub const DEFAULT_MARKET_ADDRESSES: &[&str] = &[
    "0x7a250d5630b4cf539739df2c5dacb4c659f2488d", // Uniswap V2 Router
    "0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45", // Uniswap V3 Router
    "0x1111111254eeb25477b68fb85ed929f73a960582", // 1inch Router
    "0x8d58e202016122aae65be55694dbce1b810b4072", // Uniswap V2 pool
    "0xba12222222228d8ba445958a75a0704d566bf2c8", // Balancer vault
    "0x1caa19d70820cb61e78319759fac46c8c52f8809",
    "0xfa4a4c553733f2e0c54f1c4b0ddc1fa2f5f10ce6",
];

/// Accepted `hours` values for a report window.
pub const TIME_RANGES_HOURS: &[u32] = &[1, 6, 12, 24];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on `/api/*` when set.
    pub api_token: Option<String>,

    // Bitquery (API key optional at startup; reports fail without it)
    pub bitquery_api_key: Option<String>,
    pub bitquery_endpoint: String,
    pub bitquery_max_retries: u32,

    // Row limits per query
    pub holder_limit: u32,
    pub transfer_limit: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            bitquery_api_key: env::var("BITQUERY_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            bitquery_endpoint: env::var("BITQUERY_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_BITQUERY_ENDPOINT.into()),
            bitquery_max_retries: env_or("BITQUERY_MAX_RETRIES", 3),

            holder_limit: env_or("HOLDER_LIMIT", 100),
            transfer_limit: env_or("TRANSFER_LIMIT", 100),
        })
    }

    /// Returns true if a Bitquery API key is configured.
    pub fn has_bitquery_auth(&self) -> bool {
        self.bitquery_api_key.is_some()
    }
}

/// Everything the classifier and aggregator need, passed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub classifier: ClassifierConfig,
    pub signal: SignalConfig,
}

impl AnalysisConfig {
    /// Defaults with the built-in market address list.
    pub fn with_default_addresses() -> Self {
        Self {
            classifier: ClassifierConfig::default().with_known_addresses(DEFAULT_MARKET_ADDRESSES),
            signal: SignalConfig::default(),
        }
    }

    /// Defaults overridden by environment variables; unparsable values fall back.
    pub fn from_env() -> Self {
        let base = Self::with_default_addresses();
        let c = base.classifier;
        let s = base.signal;

        let addresses: Vec<String> = env::var("MARKET_ADDRESSES")
            .unwrap_or_default()
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        let classifier = ClassifierConfig {
            transaction_count_threshold: env_or("TX_COUNT_THRESHOLD", c.transaction_count_threshold),
            small_trade_threshold: env_or("SMALL_TRADE_THRESHOLD", c.small_trade_threshold),
            high_value_threshold: env_or("HIGH_VALUE_THRESHOLD", c.high_value_threshold),
            bucket_width_minutes: env_or("BUCKET_WIDTH_MINUTES", c.bucket_width_minutes),
            sustained_bucket_count: env_or("SUSTAINED_BUCKET_COUNT", c.sustained_bucket_count),
            sustained_small_trade_count: env_or(
                "SUSTAINED_SMALL_TRADE_COUNT",
                c.sustained_small_trade_count,
            ),
            known_market_addresses: c.known_market_addresses,
        };
        let classifier = if addresses.is_empty() {
            classifier
        } else {
            classifier.with_known_addresses(&addresses)
        };

        let signal = SignalConfig {
            significant_volume_percent: env_or(
                "SIGNIFICANT_VOLUME_PERCENT",
                s.significant_volume_percent,
            ),
            buy_pressure_high_cutoff: env_or("BUY_PRESSURE_HIGH", s.buy_pressure_high_cutoff),
            buy_pressure_low_cutoff: env_or("BUY_PRESSURE_LOW", s.buy_pressure_low_cutoff),
            include_risk_metrics: env_or("INCLUDE_RISK_METRICS", s.include_risk_metrics),
            ..s
        };

        Self { classifier, signal }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a decimal that may carry more fractional digits than `Decimal` holds.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if let Ok(d) = Decimal::from_str(raw) {
        return Some(d);
    }

    // Token amounts often carry 18 decimals; drop precision until it fits.
    let (int_part, frac_part) = raw.split_once('.')?;
    let mut chars = frac_part.chars();
    while chars.next_back().is_some() {
        let frac = chars.as_str();
        let candidate = if frac.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac}")
        };
        if let Ok(d) = Decimal::from_str(&candidate) {
            return Some(d);
        }
    }
    None
}
