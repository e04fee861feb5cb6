use std::collections::BTreeMap;

use crate::models::{Holder, HolderActivity, Transfer};

/// Running buy/sell totals per valid holder, keyed by lower-cased address.
///
/// Every valid holder gets an entry, even without activity in the window.
pub fn holder_activity(holders: &[Holder], transfers: &[Transfer]) -> BTreeMap<String, HolderActivity> {
    let mut activity: BTreeMap<String, HolderActivity> = holders
        .iter()
        .filter(|h| h.is_valid())
        .map(|h| (h.key(), HolderActivity::default()))
        .collect();

    for transfer in transfers.iter().filter(|t| t.is_valid()) {
        if let Some(entry) = activity.get_mut(&transfer.sender_key()) {
            entry.sells = entry.sells.saturating_add(transfer.amount);
            entry.net_amount = entry.net_amount.saturating_sub(transfer.amount);
            touch(entry, transfer);
        }

        if let Some(entry) = activity.get_mut(&transfer.receiver_key()) {
            entry.buys = entry.buys.saturating_add(transfer.amount);
            entry.net_amount = entry.net_amount.saturating_add(transfer.amount);
            touch(entry, transfer);
        }
    }

    activity
}

fn touch(entry: &mut HolderActivity, transfer: &Transfer) {
    if entry.last_activity.map_or(true, |t| transfer.timestamp > t) {
        entry.last_activity = Some(transfer.timestamp);
    }
}
