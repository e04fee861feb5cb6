use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::intelligence::classifier::AddressClassifier;
use crate::models::{short_address, Holder, Transfer};

/// Drop holders that behave like routers, pools or bots.
pub fn filter_market_holders(holders: Vec<Holder>, classifier: &AddressClassifier<'_>) -> Vec<Holder> {
    holders
        .into_iter()
        .filter(|holder| {
            let role = classifier.classify(&holder.address);
            if role.is_market() {
                tracing::debug!(
                    address = %short_address(&holder.address),
                    known = classifier.config().is_known_market(&holder.address),
                    "Filtered out market holder"
                );
                metrics::counter!("market_holders_filtered").increment(1);
            }
            !role.is_market()
        })
        .collect()
}

/// Keep only transfers where at least one side is a market address.
pub fn filter_market_transfers(transfers: &[Transfer], classifier: &AddressClassifier<'_>) -> Vec<Transfer> {
    transfers
        .iter()
        .filter(|t| {
            t.is_valid()
                && (classifier.classify(&t.sender).is_market()
                    || classifier.classify(&t.receiver).is_market())
        })
        .cloned()
        .collect()
}

/// Newest first, one entry per (timestamp, amount, sender, receiver).
pub fn dedupe_transfers(mut transfers: Vec<Transfer>) -> Vec<Transfer> {
    transfers.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    transfers.retain(|t| {
        let first = seen.insert((
            t.timestamp,
            t.amount.normalize(),
            t.sender_key(),
            t.receiver_key(),
        ));
        if !first {
            tracing::trace!(transfer = %t, "Dropped duplicate");
        }
        first
    });
    transfers
}

/// Transfers at or after `since`.
pub fn within_window(transfers: Vec<Transfer>, since: DateTime<Utc>) -> Vec<Transfer> {
    transfers
        .into_iter()
        .filter(|t| t.timestamp >= since)
        .collect()
}
