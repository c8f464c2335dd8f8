use crate::config::Config;
use crate::core::indicators::{self, heikin_ashi};
use crate::core::trend::determine_trend;
use crate::models::{Action, CandleSeries, Trend};

use super::levels::{last_adx, last_atr, last_ema, last_macd, usable_atr, SwingLevels};
use super::signals::{StrategyInput, StrategySignal};

/// Entry/tp/sl pinned to the projected swings.
///
/// Buys enter just above the projected low; sells need a projected high and
/// enter just below it. Without a projected high the buy target falls back
/// to `current + atr * tp_offset`.
fn anchored_levels(
    action: Action,
    current: f64,
    atr: f64,
    tp_offset: f64,
    levels: &SwingLevels,
    cfg: &Config,
) -> Option<(f64, f64, f64)> {
    let above = 1.0 + cfg.swing.snap_offset;
    let below = 1.0 - cfg.swing.snap_offset;
    match action {
        Action::Buy => {
            let pl = levels.projected_low?;
            let tp = levels.projected_high.unwrap_or(current + atr * tp_offset);
            Some((pl * above, tp, pl * below))
        }
        Action::Sell => {
            let ph = levels.projected_high?;
            Some((ph * below, ph * cfg.strategy.anchored_sell_tp, ph * above))
        }
    }
}

fn near(current: f64, level: f64, tolerance: f64) -> bool {
    level != 0.0 && (current - level).abs() / level <= tolerance
}

fn signal(
    action: Action,
    (entry, take_profit, stop_loss): (f64, f64, f64),
    atr: f64,
    cfg: &Config,
    strategy: &str,
) -> StrategySignal {
    StrategySignal {
        action,
        entry,
        take_profit,
        stop_loss,
        trailing_stop: atr * cfg.strategy.trailing_stop_multiplier,
        strategy: strategy.to_string(),
    }
}

/// Price on the far side of the 61.8% retracement with MACD and signal line apart.
pub fn fib_macd(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let fc = &sc.fib_macd;
    if input.primary.len() < sc.min_history {
        return None;
    }
    let trend = determine_trend(input.context, &cfg.trend);
    if trend == Trend::Neutral {
        return None;
    }

    let recent = input.primary.tail(fc.lookback);
    let source = input.swing_source();
    let current = source.last_close()?;

    let fib_high = recent.highs_max();
    let fib_low = recent.lows_min();
    let fib_level = fib_high - fc.retracement * (fib_high - fib_low);
    if (current - fib_level).abs() / current < fc.distance_threshold {
        return None;
    }

    let (line, signal_line, _) = last_macd(input.primary, sc)?;
    if (line - signal_line).abs() < fc.macd_diff_threshold {
        return None;
    }
    let atr = usable_atr(input.primary, sc)?;

    let levels = SwingLevels::from_series(source, &cfg.swing);
    let pl = levels.projected_low?;
    if !near(current, pl, fc.proximity) {
        tracing::debug!("[Fib_MACD] price {:.4} too far from projected low {:.4}", current, pl);
        return None;
    }

    let action = match trend {
        Trend::Upward if current < fib_level => Action::Buy,
        Trend::Downward if current > fib_level => Action::Sell,
        _ => return None,
    };
    let lv = anchored_levels(action, current, atr, sc.tp_atr_offset, &levels, cfg)?;
    Some(signal(action, lv, atr, cfg, "Fib_MACD"))
}

/// Heikin-Ashi bar colour agreeing with the context trend and price clear of the HA EMA.
pub fn heikin_ashi_ema(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let hc = &sc.heikin_ashi;
    if input.primary.len() < sc.min_history || input.context.len() < sc.min_history {
        return None;
    }
    let trend = determine_trend(input.context, &cfg.trend);
    if trend == Trend::Neutral {
        return None;
    }

    let ha = heikin_ashi(input.primary);
    let last_ha = ha.last()?;
    let source: &CandleSeries = match input.fine {
        Some(fine) if !fine.is_empty() => fine,
        _ => &ha,
    };
    let current = source.last_close()?;

    let levels = SwingLevels::from_series(source, &cfg.swing);
    let pl = levels.projected_low?;
    if !near(current, pl, hc.proximity) {
        return None;
    }

    let ema = last_ema(&ha.closes(), hc.ema_period)?;
    let atr = usable_atr(&ha, sc)?;
    let adx = last_adx(&ha, sc)?;
    if adx < hc.min_adx {
        return None;
    }

    let green = last_ha.close >= last_ha.open;
    let action = if trend == Trend::Upward && green && current > ema * (1.0 + hc.ema_band) {
        Action::Buy
    } else if trend == Trend::Downward && !green && current < ema * (1.0 - hc.ema_band) {
        Action::Sell
    } else {
        return None;
    };
    let lv = anchored_levels(action, current, atr, sc.tp_atr_offset, &levels, cfg)?;
    Some(signal(action, lv, atr, cfg, "HeikinAshi_EMA"))
}

/// Price outside the Bollinger bands while the context is ranging.
pub fn bollinger_reversion(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let bc = &sc.bollinger;
    if input.primary.len() < sc.min_history || input.context.len() < sc.min_history {
        return None;
    }
    if determine_trend(input.context, &cfg.trend) != Trend::Neutral {
        return None;
    }

    let closes = input.primary.closes();
    let mid = indicators::last(&indicators::sma(&closes, bc.period))?;
    let std = indicators::last(&indicators::rolling_std(&closes, bc.period))?;
    let upper = mid + bc.std_multiplier * std;
    let lower = mid - bc.std_multiplier * std;

    let source = input.swing_source();
    let current = source.last_close()?;
    let atr = last_atr(input.primary, sc)?;

    let levels = SwingLevels::from_series(source, &cfg.swing);
    levels.projected_low?;

    let action = if current <= lower * bc.lower_multiplier {
        Action::Buy
    } else if current >= upper * bc.upper_multiplier {
        Action::Sell
    } else {
        return None;
    };
    let tp_offset = sc.tp_atr_offset + bc.tp_sl_offset;
    let lv = anchored_levels(action, current, atr, tp_offset, &levels, cfg)?;
    Some(signal(action, lv, atr, cfg, "BollingerReversion"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{default_test_config, make_closes, make_double_bottom};
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_buys_below_lower_band() {
        let cfg = default_test_config();
        let mut closes: Vec<f64> = (0..59)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        closes.push(95.0);
        let primary = make_closes(&closes);
        let context = make_closes(&[100.0; 60]);
        let fine = make_double_bottom();
        let input = StrategyInput::new(&primary, &context).with_fine(&fine);

        let sig = bollinger_reversion(&input, &cfg).unwrap();
        assert_eq!(sig.action, Action::Buy);
        assert_relative_eq!(sig.entry, 95.3 * 1.002, epsilon = 1e-6);
        assert_relative_eq!(sig.take_profit, 100.1, epsilon = 1e-6);
        assert_relative_eq!(sig.stop_loss, 95.3 * 0.998, epsilon = 1e-6);
    }

    #[test]
    fn bollinger_needs_ranging_context() {
        let cfg = default_test_config();
        let primary = make_closes(&[100.0; 60]);
        let rising: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let context = make_closes(&rising);
        let fine = make_double_bottom();
        let input = StrategyInput::new(&primary, &context).with_fine(&fine);
        assert!(bollinger_reversion(&input, &cfg).is_none());
    }

    #[test]
    fn fib_macd_buys_deep_pullback_in_uptrend() {
        let cfg = default_test_config();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 0.5 * (i * i) as f64).collect();
        let primary = make_closes(&closes);
        let fine = make_double_bottom();
        let input = StrategyInput::new(&primary, &primary).with_fine(&fine);

        let sig = fib_macd(&input, &cfg).unwrap();
        assert_eq!(sig.action, Action::Buy);
        assert_eq!(sig.strategy, "Fib_MACD");
        assert_relative_eq!(sig.entry, 95.3 * 1.002, epsilon = 1e-6);
        assert_relative_eq!(sig.take_profit, 100.1, epsilon = 1e-6);
        assert_relative_eq!(sig.stop_loss, 95.3 * 0.998, epsilon = 1e-6);
    }

    #[test]
    fn fib_macd_requires_projected_low() {
        let cfg = default_test_config();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 0.5 * (i * i) as f64).collect();
        let primary = make_closes(&closes);
        // monotonic primary doubles as swing source and has no swings
        let input = StrategyInput::new(&primary, &primary);
        assert!(fib_macd(&input, &cfg).is_none());
    }

    #[test]
    fn heikin_ashi_gates_on_history_and_trend() {
        let cfg = default_test_config();
        let primary = make_closes(&(0..60).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let short_context = make_closes(&[100.0; 20]);
        let flat_context = make_closes(&[100.0; 60]);
        let fine = make_double_bottom();

        let input = StrategyInput::new(&primary, &short_context).with_fine(&fine);
        assert!(heikin_ashi_ema(&input, &cfg).is_none());
        let input = StrategyInput::new(&primary, &flat_context).with_fine(&fine);
        assert!(heikin_ashi_ema(&input, &cfg).is_none());
    }

    #[test]
    fn anchored_sell_needs_projected_high() {
        let cfg = default_test_config();
        let levels = SwingLevels {
            projected_low: Some(99.0),
            ..SwingLevels::default()
        };
        assert!(anchored_levels(Action::Sell, 100.0, 1.0, 0.5, &levels, &cfg).is_none());
        let (entry, tp, sl) = anchored_levels(Action::Buy, 100.0, 2.0, 0.5, &levels, &cfg).unwrap();
        assert_relative_eq!(entry, 99.0 * 1.002);
        assert_relative_eq!(tp, 101.0);
        assert_relative_eq!(sl, 99.0 * 0.998);
    }
}
