use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{normalize_address, short_address};

/// A single on-chain token movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub sender: String,
    pub receiver: String,
    pub currency_symbol: String,
}

impl Transfer {
    pub fn sender_key(&self) -> String {
        normalize_address(&self.sender)
    }

    pub fn receiver_key(&self) -> String {
        normalize_address(&self.receiver)
    }

    /// Records missing a party or carrying a non-positive amount are skipped.
    pub fn is_valid(&self) -> bool {
        !self.sender.trim().is_empty()
            && !self.receiver.trim().is_empty()
            && self.amount > Decimal::ZERO
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer: {} -> {} amount={} {} at={}",
            short_address(&self.sender),
            short_address(&self.receiver),
            self.amount,
            self.currency_symbol,
            self.timestamp.to_rfc3339(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_shortens_addresses() {
        let t = Transfer {
            timestamp: Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap(),
            amount: Decimal::from(42),
            sender: "0x7a250d5630b4cf539739df2c5dacb4c659f2488d".into(),
            receiver: "0x1111111111111111111111111111111111111111".into(),
            currency_symbol: "TKN".into(),
        };

        assert_eq!(
            t.to_string(),
            "Transfer: 0x7a25...488d -> 0x1111...1111 amount=42 TKN at=2024-12-01T12:00:00+00:00"
        );
    }
}
