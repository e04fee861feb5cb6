use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::intelligence::classifier::AddressClassifier;
use crate::intelligence::signal::{self, percent, ratio, saturating_sum};
use crate::models::{
    AddressRole, Holder, MarketFlow, RiskMetrics, StatisticsReport, TradingActivity, Transfer,
    VolumeBreakdown,
};

const DEFAULT_TOKEN_SYMBOL: &str = "tokens";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Sums folded over the transfer window before the report is built.
#[derive(Debug, Default)]
struct VolumeTotals {
    buy: Decimal,
    sell: Decimal,
    buy_by_holder: HashMap<String, Decimal>,
    sell_by_holder: HashMap<String, Decimal>,
    market_buy: Decimal,
    market_sell: Decimal,
    high_value: usize,
}

/// Fold a holder snapshot and a transfer window into a [`StatisticsReport`].
///
/// `None` holders means the fetch produced no holder list at all and yields
/// [`AnalysisError::InvalidInput`]. Holders with an empty address or a
/// non-positive balance and transfers missing a party are skipped.
pub fn aggregate(
    holders: Option<&[Holder]>,
    transfers: &[Transfer],
    config: &AnalysisConfig,
) -> Result<StatisticsReport, AnalysisError> {
    let holders = holders.ok_or_else(|| {
        tracing::warn!("Invalid holders data received");
        AnalysisError::InvalidInput("no valid holder data".into())
    })?;

    let token_symbol = holders
        .first()
        .map(|h| h.currency_symbol.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TOKEN_SYMBOL)
        .to_string();

    let balances: HashMap<String, Decimal> = holders
        .iter()
        .filter(|h| h.is_valid())
        .map(|h| (h.key(), h.balance))
        .collect();

    let total_holdings = saturating_sum(balances.values().copied());
    let totals = fold_transfers(&balances, transfers, config);

    let total_volume = totals.buy.saturating_add(totals.sell);
    let unique_buyers = totals.buy_by_holder.len();
    let unique_sellers = totals.sell_by_holder.len();

    let volume_breakdown = VolumeBreakdown {
        buys: percent(totals.buy, total_volume),
        sells: percent(totals.sell, total_volume),
    };

    let trading_activity = TradingActivity {
        percent_of_holdings_bought: percent(totals.buy, total_holdings),
        percent_of_holdings_sold: percent(totals.sell, total_holdings),
        average_buyer_percentage: average_holding_percentage(&totals.buy_by_holder, &balances),
        average_seller_percentage: average_holding_percentage(&totals.sell_by_holder, &balances),
    };

    let market_flow = MarketFlow {
        market_buy_volume: totals.market_buy,
        market_sell_volume: totals.market_sell,
        buy_to_sell_ratio: (!totals.market_sell.is_zero())
            .then(|| ratio(totals.market_buy, totals.market_sell)),
        average_buy_size: ratio(totals.market_buy, Decimal::from(unique_buyers as i64)),
        average_sell_size: ratio(totals.market_sell, Decimal::from(unique_sellers as i64)),
    };

    let pressure = signal::buy_pressure(totals.buy, total_volume);
    let trading_signal = if total_volume.is_zero() {
        signal::no_activity()
    } else {
        let direction = signal::determine_signal(
            pressure,
            trading_activity.percent_of_holdings_bought,
            trading_activity.percent_of_holdings_sold,
            &config.signal,
        );
        signal::with_trade_sizes(
            direction,
            market_flow.average_buy_size,
            market_flow.average_sell_size,
        )
    };

    let risk = config
        .signal
        .include_risk_metrics
        .then(|| risk_metrics(&balances, total_holdings, total_volume, config));

    tracing::debug!(
        holders = balances.len(),
        transfers = transfers.len(),
        total_volume = %total_volume,
        signal = %trading_signal.signal,
        "Statistics aggregated"
    );

    Ok(StatisticsReport {
        token_symbol,
        total_holders: holders.len(),
        total_holdings,
        total_buy_volume: totals.buy,
        total_sell_volume: totals.sell,
        total_volume,
        unique_buyers,
        unique_sellers,
        volume_breakdown,
        trading_activity,
        buy_pressure: pressure.saturating_mul(Decimal::ONE_HUNDRED),
        trading_signal,
        market_flow,
        high_value_transfers: totals.high_value,
        risk,
    })
}

/// Attribute each transfer to the tracked holders on either side.
///
/// A transfer between two tracked holders is both a sell by the sender and
/// a buy by the receiver.
fn fold_transfers(
    balances: &HashMap<String, Decimal>,
    transfers: &[Transfer],
    config: &AnalysisConfig,
) -> VolumeTotals {
    let classifier = AddressClassifier::new(&config.classifier, transfers);
    let mut roles: HashMap<String, AddressRole> = HashMap::new();
    let mut totals = VolumeTotals::default();
    let mut skipped = 0usize;

    for transfer in transfers {
        if !transfer.is_valid() {
            skipped += 1;
            continue;
        }

        let amount = transfer.amount;
        let sender = transfer.sender_key();
        let receiver = transfer.receiver_key();

        if balances.contains_key(&sender) {
            totals.sell = totals.sell.saturating_add(amount);
            let held = totals.sell_by_holder.entry(sender.clone()).or_default();
            *held = held.saturating_add(amount);
        }

        if balances.contains_key(&receiver) {
            totals.buy = totals.buy.saturating_add(amount);
            let held = totals.buy_by_holder.entry(receiver.clone()).or_default();
            *held = held.saturating_add(amount);
        }

        if amount > config.classifier.high_value_threshold {
            totals.high_value += 1;
        }

        let sender_role = *roles
            .entry(sender.clone())
            .or_insert_with(|| classifier.classify(&sender));
        let receiver_role = *roles
            .entry(receiver.clone())
            .or_insert_with(|| classifier.classify(&receiver));

        match (sender_role, receiver_role) {
            (AddressRole::Market, AddressRole::Peer) => {
                totals.market_buy = totals.market_buy.saturating_add(amount)
            }
            (AddressRole::Peer, AddressRole::Market) => {
                totals.market_sell = totals.market_sell.saturating_add(amount)
            }
            _ => {}
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped malformed transfers");
    }

    totals
}

/// Mean of (volume / balance * 100) over the holders that have volume.
fn average_holding_percentage(
    volumes: &HashMap<String, Decimal>,
    balances: &HashMap<String, Decimal>,
) -> Decimal {
    if volumes.is_empty() {
        return Decimal::ZERO;
    }

    let total = saturating_sum(volumes.iter().map(|(address, volume)| {
        let balance = balances.get(address).copied().unwrap_or(Decimal::ZERO);
        percent(*volume, balance)
    }));

    ratio(total, Decimal::from(volumes.len() as i64))
}

fn risk_metrics(
    balances: &HashMap<String, Decimal>,
    total_holdings: Decimal,
    total_volume: Decimal,
    config: &AnalysisConfig,
) -> RiskMetrics {
    let mut sorted: Vec<Decimal> = balances.values().copied().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let top = saturating_sum(sorted.iter().take(config.signal.concentration_top_n).copied());

    let trading_intensity = ratio(total_volume, total_holdings);

    let volatility = signal::volatility_level(trading_intensity, &config.signal);

    RiskMetrics {
        holder_concentration: ratio(top, total_holdings),
        trading_intensity,
        volatility,
        volatility_description: volatility.description().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
