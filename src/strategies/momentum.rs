use crate::config::Config;
use crate::core::indicators;
use crate::models::Action;

use super::levels::{
    last_adx, last_atr, last_ema, last_macd, last_stoch_rsi, refined_entry, swing_exits,
    usable_atr, SwingLevels,
};
use super::signals::{StrategyInput, StrategySignal};

/// StochRSI extreme with the MACD histogram already turning the other way.
fn stoch_macd_action(input: &StrategyInput, cfg: &Config) -> Option<Action> {
    let mc = &cfg.strategy.momentum;
    let stoch = last_stoch_rsi(input.primary, &cfg.strategy)?;
    let (_, _, hist) = last_macd(input.primary, &cfg.strategy)?;
    if stoch < mc.stoch_buy && hist > 0.0 {
        Some(Action::Buy)
    } else if stoch > mc.stoch_sell && hist < 0.0 {
        Some(Action::Sell)
    } else {
        None
    }
}

fn trending_too_hard(input: &StrategyInput, cfg: &Config) -> bool {
    last_adx(input.primary, &cfg.strategy).is_some_and(|adx| adx >= cfg.strategy.momentum.max_adx)
}

fn refined_signal(
    input: &StrategyInput,
    cfg: &Config,
    action: Action,
    atr: f64,
    multiplier: f64,
    strategy: &str,
) -> Option<StrategySignal> {
    let source = input.swing_source();
    let current = source.last_close()?;
    let levels = SwingLevels::from_series(source, &cfg.swing);
    let entry = refined_entry(action, current, &levels, &cfg.swing);
    let (take_profit, stop_loss) = swing_exits(action, entry, atr, multiplier, &levels, &cfg.swing);
    Some(StrategySignal {
        action,
        entry,
        take_profit,
        stop_loss,
        trailing_stop: atr * cfg.strategy.trailing_stop_multiplier,
        strategy: strategy.to_string(),
    })
}

pub fn momo(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let mc = &sc.momentum;
    if input.primary.len() < sc.min_history {
        return None;
    }
    let atr = usable_atr(input.primary, sc)?;
    let action = stoch_macd_action(input, cfg)?;
    if trending_too_hard(input, cfg) {
        tracing::debug!("[Momo] adx above {}, skipping reversal", mc.max_adx);
        return None;
    }

    let volumes = input.primary.volumes();
    let vol_avg = indicators::last(&indicators::sma(&volumes, mc.volume_period))?;
    let vol = volumes.last().copied()?;
    if vol < mc.volume_multiplier * vol_avg {
        return None;
    }

    refined_signal(input, cfg, action, atr, mc.momo_atr_multiplier, "Momo")
}

pub fn stoch_rsi_macd(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    if input.primary.len() < sc.min_history {
        return None;
    }
    let atr = last_atr(input.primary, sc)?;
    let action = stoch_macd_action(input, cfg)?;
    if trending_too_hard(input, cfg) {
        return None;
    }
    refined_signal(
        input,
        cfg,
        action,
        atr,
        sc.momentum.stoch_macd_atr_multiplier,
        "StochRSI_MACD",
    )
}

/// Three EMAs stacked with clear gaps, StochRSI at the opposite extreme, entry near the recent extreme.
pub fn triple_ema_stoch_rsi(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let tc = &sc.triple_ema;
    if input.primary.len() < sc.min_history {
        return None;
    }

    let closes = input.primary.closes();
    let short = last_ema(&closes, tc.short_period)?;
    let mid = last_ema(&closes, tc.mid_period)?;
    let long = last_ema(&closes, tc.long_period)?;
    let bullish = short > mid * (1.0 + tc.min_gap) && mid > long * (1.0 + tc.min_gap);
    let bearish = short < mid * (1.0 - tc.min_gap) && mid < long * (1.0 - tc.min_gap);
    if !bullish && !bearish {
        return None;
    }

    let stoch = last_stoch_rsi(input.primary, sc)?;
    let atr = last_atr(input.primary, sc)?;
    let action = if bullish && stoch < tc.stoch_buy {
        Action::Buy
    } else if bearish && stoch > tc.stoch_sell {
        Action::Sell
    } else {
        return None;
    };

    let source = input.swing_source();
    let current = source.last_close()?;
    let levels = SwingLevels::from_series(source, &cfg.swing);
    let entry = refined_entry(action, current, &levels, &cfg.swing);

    let recent = input.primary.tail(tc.extreme_lookback);
    match action {
        Action::Buy if entry > recent.lows_min() * (1.0 + tc.extreme_band) => return None,
        Action::Sell if entry < recent.highs_max() * (1.0 - tc.extreme_band) => return None,
        _ => {}
    }

    let offset = atr * tc.atr_multiplier;
    let (take_profit, stop_loss) = match action {
        Action::Buy => (entry + offset, entry - offset),
        Action::Sell => (entry - offset, entry + offset),
    };
    Some(StrategySignal {
        action,
        entry,
        take_profit,
        stop_loss,
        trailing_stop: atr * sc.trailing_stop_multiplier,
        strategy: "TripleEMA_StochRSI_ATR".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{default_test_config, make_bullish_trend, make_closes};
    use approx::assert_relative_eq;

    #[test]
    fn triple_ema_buys_near_recent_low() {
        let cfg = default_test_config();
        let primary = make_bullish_trend(60, 100.0);
        // RSI pinned at 100 gives a flat StochRSI window, which reads 0
        let fine = make_closes(&[300.0; 30]);
        let input = StrategyInput::new(&primary, &primary).with_fine(&fine);

        let sig = triple_ema_stoch_rsi(&input, &cfg).unwrap();
        assert_eq!(sig.action, Action::Buy);
        assert_relative_eq!(sig.entry, 300.0);
        assert_relative_eq!(sig.take_profit, 309.0, epsilon = 1e-9);
        assert_relative_eq!(sig.stop_loss, 291.0, epsilon = 1e-9);
    }

    #[test]
    fn triple_ema_sells_bearish_stack_near_recent_high() {
        let cfg = default_test_config();
        // Steady decline, then a five-bar bounce that pushes RSI to the top of its window.
        let closes: Vec<f64> = (0..56)
            .map(|i| 1000.0 - 10.0 * i as f64)
            .chain((1..=5).map(|i| 450.0 + i as f64))
            .collect();
        let primary = make_closes(&closes);
        // 40-bar high is 800 * 1.001
        let fine = make_closes(&[800.0; 30]);
        let input = StrategyInput::new(&primary, &primary).with_fine(&fine);

        let sig = triple_ema_stoch_rsi(&input, &cfg).unwrap();
        let atr = last_atr(&primary, &cfg.strategy).unwrap();
        assert_eq!(sig.action, Action::Sell);
        assert_relative_eq!(sig.entry, 800.0);
        assert_relative_eq!(sig.take_profit, 800.0 - 0.75 * atr, epsilon = 1e-9);
        assert_relative_eq!(sig.stop_loss, 800.0 + 0.75 * atr, epsilon = 1e-9);
    }

    #[test]
    fn triple_ema_rejects_entry_far_from_low() {
        let cfg = default_test_config();
        let primary = make_bullish_trend(60, 100.0);
        let input = StrategyInput::new(&primary, &primary);
        assert!(triple_ema_stoch_rsi(&input, &cfg).is_none());
    }

    #[test]
    fn momentum_reversals_skip_strong_trends() {
        let cfg = default_test_config();
        // accelerating rise: StochRSI 0, histogram positive, ADX far above 25
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 0.5 * (i * i) as f64).collect();
        let primary = make_closes(&closes);
        let input = StrategyInput::new(&primary, &primary);
        assert_eq!(stoch_macd_action(&input, &cfg), Some(Action::Buy));
        assert!(stoch_rsi_macd(&input, &cfg).is_none());
        assert!(momo(&input, &cfg).is_none());
    }

    #[test]
    fn stoch_rsi_macd_fires_when_adx_gate_relaxed() {
        let mut cfg = default_test_config();
        cfg.strategy.momentum.max_adx = 101.0;
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 0.5 * (i * i) as f64).collect();
        let primary = make_closes(&closes);
        let input = StrategyInput::new(&primary, &primary);

        let sig = stoch_rsi_macd(&input, &cfg).unwrap();
        assert_eq!(sig.action, Action::Buy);
        assert_relative_eq!(sig.entry, *closes.last().unwrap());
        assert!(sig.take_profit > sig.entry && sig.stop_loss < sig.entry);

        // flat volume never clears 1.5x its own average
        assert!(momo(&input, &cfg).is_none());
    }

    #[test]
    fn momentum_needs_history() {
        let cfg = default_test_config();
        let primary = make_bullish_trend(30, 100.0);
        let input = StrategyInput::new(&primary, &primary);
        assert!(momo(&input, &cfg).is_none());
        assert!(stoch_rsi_macd(&input, &cfg).is_none());
        assert!(triple_ema_stoch_rsi(&input, &cfg).is_none());
    }
}
