use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::normalize_address;

/// A token holder at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    pub address: String,
    pub balance: Decimal,
    pub currency_symbol: String,
}

impl Holder {
    pub fn new(address: impl Into<String>, balance: Decimal, currency_symbol: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Lower-cased identity of this holder.
    pub fn key(&self) -> String {
        normalize_address(&self.address)
    }

    /// A holder counts only with a non-empty address and a positive balance.
    pub fn is_valid(&self) -> bool {
        !self.address.trim().is_empty() && self.balance > Decimal::ZERO
    }
}
