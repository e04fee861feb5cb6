use std::collections::HashMap;

use crate::intelligence::classifier::AddressClassifier;
use crate::models::{ClassifiedTransfer, Holder, TradeSide, Transfer};

/// 1-based position of each valid holder in the fetched order.
///
/// The first occurrence wins when an address repeats.
pub fn holder_ranks(holders: &[Holder]) -> HashMap<String, usize> {
    let mut ranks = HashMap::new();
    for (index, holder) in holders.iter().filter(|h| h.is_valid()).enumerate() {
        ranks.entry(holder.key()).or_insert(index + 1);
    }
    ranks
}

/// Tag each transfer by market side and attach the trading holder's rank.
///
/// A market sender makes the row a buy, else a market receiver makes it a
/// sell. The rank shown is the receiver's for buys and the sender's otherwise.
pub fn classify_transfers(
    transfers: &[Transfer],
    classifier: &AddressClassifier<'_>,
    ranks: &HashMap<String, usize>,
) -> Vec<ClassifiedTransfer> {
    transfers
        .iter()
        .filter(|t| t.is_valid())
        .map(|t| {
            let side = if classifier.classify(&t.sender).is_market() {
                TradeSide::Buy
            } else if classifier.classify(&t.receiver).is_market() {
                TradeSide::Sell
            } else {
                TradeSide::Transfer
            };

            let trader = match side {
                TradeSide::Buy => t.receiver_key(),
                TradeSide::Sell | TradeSide::Transfer => t.sender_key(),
            };

            ClassifiedTransfer {
                timestamp: t.timestamp,
                amount: t.amount,
                sender: t.sender.clone(),
                receiver: t.receiver.clone(),
                side,
                holder_rank: ranks.get(&trader).copied(),
            }
        })
        .collect()
}
