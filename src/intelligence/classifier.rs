use std::collections::{BTreeSet, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{normalize_address, short_address, AddressRole, Transfer};

/// Thresholds and the static address list used to detect market addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Known routers and pools, lower-cased.
    pub known_market_addresses: BTreeSet<String>,
    /// More transfers than this in the window marks an address as market.
    pub transaction_count_threshold: usize,
    /// Transfers strictly below this amount count as small trades.
    pub small_trade_threshold: Decimal,
    /// Transfers strictly above this amount count as high value.
    pub high_value_threshold: Decimal,
    pub bucket_width_minutes: i64,
    /// Minimum distinct active buckets for the sustained-activity rule.
    pub sustained_bucket_count: usize,
    /// Small trades must exceed this count for the sustained-activity rule.
    pub sustained_small_trade_count: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            known_market_addresses: BTreeSet::new(),
            transaction_count_threshold: 30,
            small_trade_threshold: Decimal::from(500),
            high_value_threshold: Decimal::from(100_000),
            bucket_width_minutes: 5,
            sustained_bucket_count: 5,
            sustained_small_trade_count: 10,
        }
    }
}

impl ClassifierConfig {
    /// Replace the known market address set, normalizing every entry.
    pub fn with_known_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_market_addresses = addresses
            .into_iter()
            .map(|a| normalize_address(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    pub fn is_known_market(&self, address: &str) -> bool {
        self.known_market_addresses
            .contains(&normalize_address(address))
    }
}

/// Counts gathered from one address's transfer history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityProfile {
    pub transaction_count: usize,
    pub active_buckets: usize,
    pub small_trades: usize,
    pub high_value_trades: usize,
}

/// Summarize an address's history against the configured thresholds.
pub fn profile_address<'a, I>(config: &ClassifierConfig, history: I) -> ActivityProfile
where
    I: IntoIterator<Item = &'a Transfer>,
{
    let bucket_ms = config.bucket_width_minutes.max(1).saturating_mul(60_000);
    let mut buckets: HashSet<i64> = HashSet::new();
    let mut profile = ActivityProfile::default();

    for transfer in history {
        profile.transaction_count += 1;
        buckets.insert(transfer.timestamp.timestamp_millis().div_euclid(bucket_ms));

        if transfer.amount < config.small_trade_threshold {
            profile.small_trades += 1;
        } else if transfer.amount > config.high_value_threshold {
            profile.high_value_trades += 1;
        }
    }

    profile.active_buckets = buckets.len();
    profile
}

/// Classify an address from the known-address list and its transfer history.
///
/// Rules, first match wins:
/// - **Market**: listed in `known_market_addresses`.
/// - **Market**: more than `transaction_count_threshold` transfers.
/// - **Market**: active in at least `sustained_bucket_count` time buckets
///   with more than `sustained_small_trade_count` small trades.
/// - **Peer**: everything else, including an empty history.
pub fn classify_address<'a, I>(address: &str, config: &ClassifierConfig, history: I) -> AddressRole
where
    I: IntoIterator<Item = &'a Transfer>,
{
    let address = normalize_address(address);

    if config.known_market_addresses.contains(&address) {
        return AddressRole::Market;
    }

    let profile = profile_address(config, history);

    if is_high_frequency(config, &profile) {
        tracing::debug!(
            address = %short_address(&address),
            transactions = profile.transaction_count,
            "High transaction count, classified as market"
        );
        return AddressRole::Market;
    }

    if is_sustained_activity(config, &profile) {
        tracing::debug!(
            address = %short_address(&address),
            buckets = profile.active_buckets,
            small_trades = profile.small_trades,
            "Sustained small-trade activity, classified as market"
        );
        return AddressRole::Market;
    }

    AddressRole::Peer
}

fn is_high_frequency(config: &ClassifierConfig, profile: &ActivityProfile) -> bool {
    profile.transaction_count > config.transaction_count_threshold
}

/// Bots emit many small trades spread evenly over time.
fn is_sustained_activity(config: &ClassifierConfig, profile: &ActivityProfile) -> bool {
    profile.active_buckets >= config.sustained_bucket_count
        && profile.small_trades > config.sustained_small_trade_count
}

// ---------------------------------------------------------------------------
// TransferIndex
// ---------------------------------------------------------------------------

/// Transfers grouped by participating address, built once per analysis pass.
#[derive(Debug, Default)]
pub struct TransferIndex<'a> {
    by_address: HashMap<String, Vec<&'a Transfer>>,
}

impl<'a> TransferIndex<'a> {
    pub fn new(transfers: &'a [Transfer]) -> Self {
        let mut by_address: HashMap<String, Vec<&'a Transfer>> = HashMap::new();

        for transfer in transfers.iter().filter(|t| t.is_valid()) {
            let sender = transfer.sender_key();
            let receiver = transfer.receiver_key();

            // Self-transfers count once.
            if receiver != sender {
                by_address.entry(receiver).or_default().push(transfer);
            }
            by_address.entry(sender).or_default().push(transfer);
        }

        Self { by_address }
    }

    /// History of one address; empty when it never appears.
    pub fn history(&self, address: &str) -> &[&'a Transfer] {
        self.by_address
            .get(&normalize_address(address))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Classifier bound to one transfer window.
pub struct AddressClassifier<'a> {
    config: &'a ClassifierConfig,
    index: TransferIndex<'a>,
}

impl<'a> AddressClassifier<'a> {
    pub fn new(config: &'a ClassifierConfig, transfers: &'a [Transfer]) -> Self {
        Self {
            config,
            index: TransferIndex::new(transfers),
        }
    }

    pub fn classify(&self, address: &str) -> AddressRole {
        classify_address(address, self.config, self.index.history(address).iter().copied())
    }

    pub fn config(&self) -> &ClassifierConfig {
        self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    const ROUTER: &str = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";
    const WALLET: &str = "0xabc0000000000000000000000000000000000001";
    const OTHER: &str = "0xdef0000000000000000000000000000000000002";

    fn make_transfer(sender: &str, receiver: &str, amount: i64, minutes: i64) -> Transfer {
        Transfer {
            timestamp: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            amount: Decimal::from(amount),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            currency_symbol: "TKN".to_string(),
        }
    }

    fn config() -> ClassifierConfig {
        ClassifierConfig::default().with_known_addresses([ROUTER])
    }

    #[test]
    fn test_known_address_is_market_regardless_of_history() {
        assert_eq!(classify_address(ROUTER, &config(), std::iter::empty()), AddressRole::Market);
    }

    #[test]
    fn test_known_address_match_is_case_insensitive() {
        let upper = ROUTER.to_uppercase().replace("0X", "0x");
        assert_eq!(classify_address(&upper, &config(), std::iter::empty()), AddressRole::Market);
    }

    #[test]
    fn test_empty_history_is_peer() {
        assert_eq!(classify_address(WALLET, &config(), std::iter::empty()), AddressRole::Peer);
    }

    #[test]
    fn test_thirty_one_transfers_is_market() {
        let history: Vec<Transfer> = (0..31)
            .map(|_| make_transfer(WALLET, OTHER, 1_000, 0))
            .collect();

        assert_eq!(classify_address(WALLET, &config(), &history), AddressRole::Market);
    }

    #[test]
    fn test_twenty_nine_transfers_without_pattern_is_peer() {
        // All in one bucket and all large: neither rule applies.
        let history: Vec<Transfer> = (0..29)
            .map(|_| make_transfer(WALLET, OTHER, 1_000, 0))
            .collect();

        assert_eq!(classify_address(WALLET, &config(), &history), AddressRole::Peer);
    }

    #[test]
    fn test_exactly_threshold_is_not_high_frequency() {
        let history: Vec<Transfer> = (0..30)
            .map(|_| make_transfer(WALLET, OTHER, 1_000, 0))
            .collect();

        assert_eq!(classify_address(WALLET, &config(), &history), AddressRole::Peer);
    }

    #[test]
    fn test_sustained_small_trades_is_market() {
        // 12 small trades spread over 6 five-minute buckets.
        let history: Vec<Transfer> = (0..12)
            .map(|i| make_transfer(WALLET, OTHER, 100, (i / 2) * 5))
            .collect();

        let profile = profile_address(&config(), &history);
        assert_eq!(profile.active_buckets, 6);
        assert_eq!(profile.small_trades, 12);
        assert_eq!(classify_address(WALLET, &config(), &history), AddressRole::Market);
    }

    #[test]
    fn test_small_trades_in_few_buckets_is_peer() {
        // 12 small trades but only 2 buckets.
        let history: Vec<Transfer> = (0..12)
            .map(|i| make_transfer(WALLET, OTHER, 100, i % 2 * 5))
            .collect();

        assert_eq!(classify_address(WALLET, &config(), &history), AddressRole::Peer);
    }

    #[test]
    fn test_many_buckets_with_ten_small_trades_is_peer() {
        // Small trade count must exceed 10.
        let history: Vec<Transfer> = (0..10)
            .map(|i| make_transfer(WALLET, OTHER, 100, i * 5))
            .collect();

        assert_eq!(classify_address(WALLET, &config(), &history), AddressRole::Peer);
    }

    #[test]
    fn test_known_address_with_peer_like_history_is_market() {
        // Three large transfers in one bucket would classify a wallet as peer.
        let history: Vec<Transfer> = (0..3)
            .map(|_| make_transfer(ROUTER, OTHER, 5_000, 0))
            .collect();
        assert_eq!(classify_address(OTHER, &config(), &history), AddressRole::Peer);
        assert_eq!(classify_address(ROUTER, &config(), &history), AddressRole::Market);

        // And stays market with a long window history through the classifier.
        let window: Vec<Transfer> = (0..35)
            .map(|i| make_transfer(ROUTER, OTHER, 5_000, i * 60))
            .collect();
        let cfg = config();
        let classifier = AddressClassifier::new(&cfg, &window);
        assert_eq!(classifier.classify(ROUTER), AddressRole::Market);
    }

    #[test]
    fn test_huge_bucket_width_does_not_overflow() {
        let cfg = ClassifierConfig {
            bucket_width_minutes: i64::MAX,
            ..config()
        };
        let history: Vec<Transfer> = (0..12)
            .map(|i| make_transfer(WALLET, OTHER, 100, i * 5))
            .collect();

        let profile = profile_address(&cfg, &history);
        assert_eq!(profile.transaction_count, 12);
        assert_eq!(profile.active_buckets, 1);
        assert_eq!(classify_address(WALLET, &cfg, &history), AddressRole::Peer);
    }

    #[test]
    fn test_profile_counts_high_value_trades() {
        let history = vec![
            make_transfer(WALLET, OTHER, 200_000, 0),
            make_transfer(WALLET, OTHER, 100_000, 0),
            make_transfer(WALLET, OTHER, 10, 0),
        ];

        let profile = profile_address(&config(), &history);
        assert_eq!(profile.high_value_trades, 1);
        assert_eq!(profile.small_trades, 1);
        assert_eq!(profile.active_buckets, 1);
    }

    #[test]
    fn test_index_groups_by_both_parties() {
        let transfers = vec![
            make_transfer(WALLET, OTHER, 10, 0),
            make_transfer(OTHER, WALLET, 20, 1),
            make_transfer(OTHER, ROUTER, 30, 2),
        ];
        let index = TransferIndex::new(&transfers);

        assert_eq!(index.history(WALLET).len(), 2);
        assert_eq!(index.history(&OTHER.to_uppercase().replace("0X", "0x")).len(), 3);
        assert!(index.history("0xnobody").is_empty());
    }

    #[test]
    fn test_address_classifier_uses_window_history() {
        let mut transfers: Vec<Transfer> = (0..31)
            .map(|i| make_transfer(OTHER, &format!("0x{i:040x}"), 1_000, 0))
            .collect();
        transfers.push(make_transfer(WALLET, OTHER, 5, 0));

        let config = config();
        let classifier = AddressClassifier::new(&config, &transfers);

        assert_eq!(classifier.classify(OTHER), AddressRole::Market);
        assert_eq!(classifier.classify(WALLET), AddressRole::Peer);
        assert_eq!(classifier.classify(ROUTER), AddressRole::Market);
    }
}
