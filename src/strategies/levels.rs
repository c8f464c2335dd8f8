//! Swing-anchored price levels and indicator lookups shared by the evaluators.

use crate::config::{StrategyConfig, SwingConfig};
use crate::core::indicators;
use crate::core::swings::{detect_swings, project_next_swing, SwingPoint};
use crate::models::{Action, CandleSeries};

#[derive(Debug, Clone, Default)]
pub struct SwingLevels {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
    pub projected_high: Option<f64>,
    pub projected_low: Option<f64>,
}

impl SwingLevels {
    pub fn from_series(candles: &CandleSeries, cfg: &SwingConfig) -> Self {
        let (highs, lows) = detect_swings(candles, cfg.window, cfg.limit_candles);
        let projected_high = project_next_swing(&highs);
        let projected_low = project_next_swing(&lows);
        Self {
            highs,
            lows,
            projected_high,
            projected_low,
        }
    }
}

/// Pull `current` toward `projected`.
///
/// Far projections (beyond `refine_threshold` of price) are only stepped
/// `refine_ratio` of the way; near ones snap to `projected * snap`.
pub fn refine(current: f64, projected: f64, snap: f64, cfg: &SwingConfig) -> f64 {
    if current == 0.0 {
        return projected * snap;
    }
    let diff = (projected - current).abs() / current;
    if diff > cfg.refine_threshold {
        current + (projected - current) * cfg.refine_ratio
    } else {
        projected * snap
    }
}

/// Entry refined toward the projected low (buy) or high (sell), or `current` without one.
pub fn refined_entry(action: Action, current: f64, levels: &SwingLevels, cfg: &SwingConfig) -> f64 {
    match action {
        Action::Buy => levels
            .projected_low
            .map(|pl| refine(current, pl, 1.0 + cfg.snap_offset, cfg))
            .unwrap_or(current),
        Action::Sell => levels
            .projected_high
            .map(|ph| refine(current, ph, 1.0 - cfg.snap_offset, cfg))
            .unwrap_or(current),
    }
}

/// (take_profit, stop_loss) just beyond the projected swings, or `entry -/+ atr * multiplier`.
pub fn swing_exits(
    action: Action,
    entry: f64,
    atr: f64,
    multiplier: f64,
    levels: &SwingLevels,
    cfg: &SwingConfig,
) -> (f64, f64) {
    let above = 1.0 + cfg.snap_offset;
    let below = 1.0 - cfg.snap_offset;
    match action {
        Action::Buy => (
            levels
                .projected_high
                .map(|ph| ph * above)
                .unwrap_or(entry + atr * multiplier),
            levels
                .projected_low
                .map(|pl| pl * below)
                .unwrap_or(entry - atr * multiplier),
        ),
        Action::Sell => (
            levels
                .projected_low
                .map(|pl| pl * below)
                .unwrap_or(entry - atr * multiplier),
            levels
                .projected_high
                .map(|ph| ph * above)
                .unwrap_or(entry + atr * multiplier),
        ),
    }
}

pub fn last_atr(candles: &CandleSeries, cfg: &StrategyConfig) -> Option<f64> {
    indicators::last(&indicators::atr(
        &candles.highs(),
        &candles.lows(),
        &candles.closes(),
        cfg.atr_period,
    ))
}

/// ATR that also clears the configured minimum.
pub fn usable_atr(candles: &CandleSeries, cfg: &StrategyConfig) -> Option<f64> {
    last_atr(candles, cfg).filter(|atr| *atr >= cfg.atr_min)
}

pub fn last_adx(candles: &CandleSeries, cfg: &StrategyConfig) -> Option<f64> {
    indicators::last(&indicators::adx(
        &candles.highs(),
        &candles.lows(),
        &candles.closes(),
        cfg.adx_period,
    ))
}

pub fn last_stoch_rsi(candles: &CandleSeries, cfg: &StrategyConfig) -> Option<f64> {
    indicators::last(&indicators::stoch_rsi(
        &candles.closes(),
        cfg.stoch_rsi_period,
        cfg.stoch_rsi_fastk,
    ))
}

pub fn last_macd(candles: &CandleSeries, cfg: &StrategyConfig) -> Option<(f64, f64, f64)> {
    let m = indicators::macd(&candles.closes(), cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
    Some((
        indicators::last(&m.line)?,
        indicators::last(&m.signal)?,
        indicators::last(&m.histogram)?,
    ))
}

pub fn last_ema(values: &[f64], period: usize) -> Option<f64> {
    indicators::last(&indicators::ema(values, period))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(high: Option<f64>, low: Option<f64>) -> SwingLevels {
        SwingLevels {
            projected_high: high,
            projected_low: low,
            ..SwingLevels::default()
        }
    }

    #[test]
    fn refine_steps_halfway_when_far() {
        let cfg = SwingConfig::default();
        // 10% away -> halfway
        assert!((refine(100.0, 90.0, 1.002, &cfg) - 95.0).abs() < 1e-9);
        // 1% away -> snap
        assert!((refine(100.0, 99.0, 1.002, &cfg) - 99.198).abs() < 1e-9);
    }

    #[test]
    fn refined_entry_without_projection_is_current() {
        let cfg = SwingConfig::default();
        let none = levels(None, None);
        assert_eq!(refined_entry(Action::Buy, 100.0, &none, &cfg), 100.0);
        assert_eq!(refined_entry(Action::Sell, 100.0, &none, &cfg), 100.0);

        let some = levels(Some(101.0), Some(99.0));
        assert!((refined_entry(Action::Sell, 100.0, &some, &cfg) - 101.0 * 0.998).abs() < 1e-9);
    }

    #[test]
    fn exits_fall_back_to_atr() {
        let cfg = SwingConfig::default();
        let (tp, sl) = swing_exits(Action::Buy, 100.0, 2.0, 1.5, &levels(None, None), &cfg);
        assert!((tp - 103.0).abs() < 1e-9);
        assert!((sl - 97.0).abs() < 1e-9);

        let (tp, sl) = swing_exits(Action::Sell, 100.0, 2.0, 1.0, &levels(Some(104.0), None), &cfg);
        assert!((tp - 98.0).abs() < 1e-9);
        assert!((sl - 104.0 * 1.002).abs() < 1e-9);
    }
}
