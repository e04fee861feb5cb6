use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{SignalAssessment, TradingSignal, VolatilityLevel};

/// Cutoffs used when turning volume sums into a trading signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Bought + sold as percent of holdings must reach this to be significant.
    pub significant_volume_percent: Decimal,
    pub buy_pressure_high_cutoff: Decimal,
    pub buy_pressure_low_cutoff: Decimal,
    /// Attach concentration and intensity metrics to reports.
    pub include_risk_metrics: bool,
    pub concentration_top_n: usize,
    pub high_volatility_intensity: Decimal,
    pub medium_volatility_intensity: Decimal,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            significant_volume_percent: Decimal::from(5),
            buy_pressure_high_cutoff: Decimal::new(6, 1),
            buy_pressure_low_cutoff: Decimal::new(4, 1),
            include_risk_metrics: true,
            concentration_top_n: 5,
            high_volatility_intensity: Decimal::new(1, 1),
            medium_volatility_intensity: Decimal::new(5, 2),
        }
    }
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// `part / whole`, or zero when `whole` is zero.
///
/// A quotient past the `Decimal` range saturates instead of panicking.
pub fn ratio(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole).unwrap_or_else(|| {
        if part.is_sign_negative() != whole.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// `part / whole * 100`, or zero when `whole` is zero. Saturates like [`ratio`].
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    ratio(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Sum that clamps at the `Decimal` bounds.
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Fraction of total volume that flowed into tracked holders.
pub fn buy_pressure(total_buy_volume: Decimal, total_volume: Decimal) -> Decimal {
    ratio(total_buy_volume, total_volume)
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Assessment used when the window holds no volume at all.
pub fn no_activity() -> SignalAssessment {
    SignalAssessment {
        signal: TradingSignal::Neutral,
        description: "No trading activity".into(),
    }
}

/// Classify net market direction.
///
/// Below the significance threshold the signal is always neutral and only
/// the description leans one way. Above it, buy pressure past the high
/// cutoff is buying pressure, below the low cutoff selling pressure.
pub fn determine_signal(
    buy_pressure: Decimal,
    percent_of_holdings_bought: Decimal,
    percent_of_holdings_sold: Decimal,
    config: &SignalConfig,
) -> SignalAssessment {
    let buys_pct = buy_pressure.saturating_mul(Decimal::ONE_HUNDRED);
    let moved = percent_of_holdings_bought.saturating_add(percent_of_holdings_sold);
    let significant = moved >= config.significant_volume_percent;

    if !significant {
        let lean = if buy_pressure < config.buy_pressure_low_cutoff {
            "Light selling"
        } else if buy_pressure > config.buy_pressure_high_cutoff {
            "Light buying"
        } else {
            "Light trading"
        };
        return SignalAssessment {
            signal: TradingSignal::Neutral,
            description: format!("{lean} ({buys_pct:.1}% buys, low volume)"),
        };
    }

    if buy_pressure > config.buy_pressure_high_cutoff {
        SignalAssessment {
            signal: TradingSignal::BuyingPressure,
            description: format!("Strong buying ({buys_pct:.1}% buys with significant volume)"),
        }
    } else if buy_pressure < config.buy_pressure_low_cutoff {
        SignalAssessment {
            signal: TradingSignal::SellingPressure,
            description: format!("Heavy selling ({buys_pct:.1}% buys with significant volume)"),
        }
    } else {
        SignalAssessment {
            signal: TradingSignal::Neutral,
            description: format!("Balanced trading ({buys_pct:.1}% buys)"),
        }
    }
}

/// Append average market trade sizes, e.g. `(Avg buy: 200.00 / Avg sell: 0.00)`.
pub fn with_trade_sizes(
    mut assessment: SignalAssessment,
    average_buy_size: Decimal,
    average_sell_size: Decimal,
) -> SignalAssessment {
    assessment.description = format!(
        "{} (Avg buy: {:.2} / Avg sell: {:.2})",
        assessment.description, average_buy_size, average_sell_size
    );
    assessment
}

// ---------------------------------------------------------------------------
// Volatility
// ---------------------------------------------------------------------------

pub fn volatility_level(trading_intensity: Decimal, config: &SignalConfig) -> VolatilityLevel {
    if trading_intensity > config.high_volatility_intensity {
        VolatilityLevel::High
    } else if trading_intensity > config.medium_volatility_intensity {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(Decimal::from(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent(Decimal::from(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_ratio_overflow_saturates() {
        let dust = Decimal::new(1, 12);
        let huge = Decimal::from(1_000_000_000_000_000_000i64);
        assert_eq!(ratio(huge, dust), Decimal::MAX);
        assert_eq!(ratio(-huge, dust), Decimal::MIN);
        assert_eq!(percent(Decimal::MAX, Decimal::ONE), Decimal::MAX);
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
    }

    #[test]
    fn test_percent_basic() {
        assert_eq!(percent(Decimal::from(100), Decimal::from(1_000)), Decimal::from(10));
    }

    #[test]
    fn test_strong_buying() {
        let s = determine_signal(Decimal::new(75, 2), pct(8), pct(2), &SignalConfig::default());
        assert_eq!(s.signal, TradingSignal::BuyingPressure);
        assert_eq!(s.description, "Strong buying (75.0% buys with significant volume)");
    }

    #[test]
    fn test_heavy_selling() {
        let s = determine_signal(Decimal::ZERO, pct(0), pct(10), &SignalConfig::default());
        assert_eq!(s.signal, TradingSignal::SellingPressure);
        assert!(s.description.starts_with("Heavy selling"));
    }

    #[test]
    fn test_balanced_trading() {
        let s = determine_signal(Decimal::new(5, 1), pct(5), pct(5), &SignalConfig::default());
        assert_eq!(s.signal, TradingSignal::Neutral);
        assert_eq!(s.description, "Balanced trading (50.0% buys)");
    }

    #[test]
    fn test_low_volume_is_neutral_even_with_strong_pressure() {
        let config = SignalConfig::default();

        let s = determine_signal(Decimal::new(9, 1), pct(2), pct(1), &config);
        assert_eq!(s.signal, TradingSignal::Neutral);
        assert!(s.description.starts_with("Light buying"));

        let s = determine_signal(Decimal::new(1, 1), pct(1), pct(2), &config);
        assert_eq!(s.signal, TradingSignal::Neutral);
        assert!(s.description.starts_with("Light selling"));

        let s = determine_signal(Decimal::new(5, 1), pct(1), pct(1), &config);
        assert!(s.description.starts_with("Light trading"));
    }

    #[test]
    fn test_significance_boundary_is_inclusive() {
        let s = determine_signal(Decimal::new(7, 1), Decimal::new(45, 1), Decimal::new(5, 1), &SignalConfig::default());
        assert_eq!(s.signal, TradingSignal::BuyingPressure);
    }

    #[test]
    fn test_cutoffs_are_exclusive() {
        let config = SignalConfig::default();
        let s = determine_signal(Decimal::new(6, 1), pct(10), pct(10), &config);
        assert_eq!(s.signal, TradingSignal::Neutral);
        let s = determine_signal(Decimal::new(4, 1), pct(10), pct(10), &config);
        assert_eq!(s.signal, TradingSignal::Neutral);
    }

    #[test]
    fn test_trade_sizes_appended_to_description() {
        let s = with_trade_sizes(
            determine_signal(Decimal::new(75, 2), pct(8), pct(2), &SignalConfig::default()),
            Decimal::from(150),
            Decimal::new(255, 1),
        );
        assert_eq!(s.signal, TradingSignal::BuyingPressure);
        assert_eq!(
            s.description,
            "Strong buying (75.0% buys with significant volume) (Avg buy: 150.00 / Avg sell: 25.50)"
        );
    }

    #[test]
    fn test_volatility_levels() {
        let config = SignalConfig::default();
        assert_eq!(volatility_level(Decimal::new(2, 1), &config), VolatilityLevel::High);
        assert_eq!(volatility_level(Decimal::new(6, 2), &config), VolatilityLevel::Medium);
        assert_eq!(volatility_level(Decimal::new(5, 2), &config), VolatilityLevel::Low);
        assert_eq!(volatility_level(Decimal::ZERO, &config), VolatilityLevel::Low);
    }
}
