use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TradingSignal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingSignal {
    Neutral,
    BuyingPressure,
    SellingPressure,
}

impl TradingSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingSignal::Neutral => "NEUTRAL",
            TradingSignal::BuyingPressure => "BUYING_PRESSURE",
            TradingSignal::SellingPressure => "SELLING_PRESSURE",
        }
    }
}

impl fmt::Display for TradingSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal together with its human-readable summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAssessment {
    pub signal: TradingSignal,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Report sections
// ---------------------------------------------------------------------------

/// Buy vs sell share of total volume, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBreakdown {
    pub buys: Decimal,
    pub sells: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingActivity {
    pub percent_of_holdings_bought: Decimal,
    pub percent_of_holdings_sold: Decimal,
    pub average_buyer_percentage: Decimal,
    pub average_seller_percentage: Decimal,
}

/// Volume flowing between market addresses and peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketFlow {
    pub market_buy_volume: Decimal,
    pub market_sell_volume: Decimal,
    /// Absent when there was no market sell volume.
    pub buy_to_sell_ratio: Option<Decimal>,
    pub average_buy_size: Decimal,
    pub average_sell_size: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    pub fn description(&self) -> &'static str {
        match self {
            VolatilityLevel::High => "High volatility",
            VolatilityLevel::Medium => "Moderate activity",
            VolatilityLevel::Low => "Stable trading",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Share of total holdings held by the top holders, 0..=1.
    pub holder_concentration: Decimal,
    /// Total volume relative to total holdings.
    pub trading_intensity: Decimal,
    pub volatility: VolatilityLevel,
    /// "High volatility", "Moderate activity" or "Stable trading".
    pub volatility_description: String,
}

// ---------------------------------------------------------------------------
// StatisticsReport
// ---------------------------------------------------------------------------

/// Aggregate metrics for one (holders, transfers) pair.
///
/// Built once by [`crate::intelligence::aggregate`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub token_symbol: String,
    pub total_holders: usize,
    pub total_holdings: Decimal,
    pub total_buy_volume: Decimal,
    pub total_sell_volume: Decimal,
    pub total_volume: Decimal,
    pub unique_buyers: usize,
    pub unique_sellers: usize,
    pub volume_breakdown: VolumeBreakdown,
    pub trading_activity: TradingActivity,
    /// Buy share of total volume, in percent.
    pub buy_pressure: Decimal,
    pub trading_signal: SignalAssessment,
    pub market_flow: MarketFlow,
    pub high_value_transfers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskMetrics>,
}

// ---------------------------------------------------------------------------
// HolderActivity
// ---------------------------------------------------------------------------

/// Per-holder running totals over the transfer window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolderActivity {
    pub buys: Decimal,
    pub sells: Decimal,
    pub net_amount: Decimal,
    pub last_activity: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Transaction list
// ---------------------------------------------------------------------------

/// Direction of a transfer relative to the market side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Tokens leave a market address.
    Buy,
    /// Tokens enter a market address.
    Sell,
    /// Neither side is a market address.
    Transfer,
}

/// One row of the recent-transactions list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTransfer {
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub sender: String,
    pub receiver: String,
    pub side: TradeSide,
    /// 1-based rank of the trading holder in the top-holder list.
    pub holder_rank: Option<usize>,
}
