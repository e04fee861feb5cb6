use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::parse_amount;
use crate::models::{Holder, Transfer};

// ---------------------------------------------------------------------------
// GraphQL envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvmData {
    #[serde(rename = "EVM", default)]
    pub evm: Option<Evm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Evm {
    #[serde(rename = "TokenHolders", default)]
    pub token_holders: Option<Vec<ApiTokenHolder>>,
    #[serde(rename = "Transfers", default)]
    pub transfers: Option<Vec<ApiTransfer>>,
    #[serde(rename = "ReceivingTransfers", default)]
    pub receiving_transfers: Option<Vec<ApiTransfer>>,
}

// ---------------------------------------------------------------------------
// TokenHolders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiBalance {
    #[serde(rename = "Amount", default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiAddress {
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiCurrency {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiTokenHolder {
    #[serde(rename = "Balance", default)]
    pub balance: Option<ApiBalance>,
    #[serde(rename = "Holder", default)]
    pub holder: Option<ApiAddress>,
    #[serde(rename = "Currency", default)]
    pub currency: Option<ApiCurrency>,
}

impl ApiTokenHolder {
    /// None when the address or balance is missing or unparsable.
    pub fn into_holder(self) -> Option<Holder> {
        let address = self.holder?.address?;
        let balance = parse_amount(&self.balance?.amount?)?;
        let symbol = self
            .currency
            .and_then(|c| c.symbol)
            .unwrap_or_default();
        Some(Holder::new(address, balance, symbol))
    }
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiBlock {
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiTransferBody {
    #[serde(rename = "Amount", default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,
    #[serde(rename = "Sender", default)]
    pub sender: Option<String>,
    #[serde(rename = "Receiver", default)]
    pub receiver: Option<String>,
    #[serde(rename = "Currency", default)]
    pub currency: Option<ApiCurrency>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiTransfer {
    #[serde(rename = "Block", default)]
    pub block: Option<ApiBlock>,
    #[serde(rename = "Transfer", default)]
    pub transfer: Option<ApiTransferBody>,
}

impl ApiTransfer {
    /// None when any required field is missing or unparsable.
    pub fn into_transfer(self) -> Option<Transfer> {
        let time = self.block?.time?;
        let timestamp = DateTime::parse_from_rfc3339(&time)
            .ok()?
            .with_timezone(&Utc);
        let body = self.transfer?;
        let amount = parse_amount(&body.amount?)?;

        Some(Transfer {
            timestamp,
            amount,
            sender: body.sender?,
            receiver: body.receiver?,
            currency_symbol: body.currency.and_then(|c| c.symbol).unwrap_or_default(),
        })
    }
}

/// Bitquery returns amounts as strings, but tolerate bare numbers too.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
