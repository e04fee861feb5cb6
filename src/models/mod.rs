pub mod holder;
pub mod report;
pub mod transfer;

pub use holder::Holder;
pub use report::{
    ClassifiedTransfer, HolderActivity, MarketFlow, RiskMetrics, SignalAssessment,
    StatisticsReport, TradeSide, TradingActivity, TradingSignal, VolatilityLevel, VolumeBreakdown,
};
pub use transfer::Transfer;

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AddressRole
// ---------------------------------------------------------------------------

/// Behavioural role of a chain address within one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole {
    /// Router, pool or automated trader.
    Market,
    /// Regular holder.
    Peer,
}

impl AddressRole {
    pub fn is_market(&self) -> bool {
        matches!(self, AddressRole::Market)
    }
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressRole::Market => write!(f, "market"),
            AddressRole::Peer => write!(f, "peer"),
        }
    }
}

/// Addresses are case-insensitive; every comparison goes through this.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Shorten an address for log lines: `0x7a25...488d`.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    match (address.get(..6), address.get(address.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{head}...{tail}"),
        _ => address.to_string(),
    }
}
