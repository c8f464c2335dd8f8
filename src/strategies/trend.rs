use crate::config::Config;
use crate::core::trend::{determine_short_term_trend, determine_trend};
use crate::models::{Action, Trend};

use super::levels::{last_adx, last_ema, refine, refined_entry, swing_exits, usable_atr, SwingLevels};
use super::signals::{StrategyInput, StrategySignal};

/// Price clearing the refined swing resistance (or support) in the direction of the context trend.
pub fn breakout(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let bc = &sc.breakout;
    if input.primary.len() < sc.min_history {
        return None;
    }

    let trend = determine_trend(input.context, &cfg.trend);
    if trend == Trend::Neutral {
        return None;
    }

    let source = input.swing_source();
    let current = source.last_close()?;
    let levels = SwingLevels::from_series(source, &cfg.swing);
    let refined_low = levels.projected_low.unwrap_or_else(|| source.lows_min());
    let refined_high = levels.projected_high.unwrap_or_else(|| source.highs_max());
    let support = refine(current, refined_low, 1.0, &cfg.swing);
    let resistance = refine(current, refined_high, 1.0, &cfg.swing);

    let atr = usable_atr(input.primary, sc)?;
    let adx = last_adx(input.primary, sc)?;
    if adx < bc.min_adx {
        tracing::debug!("[Breakout] adx {:.1} below {}", adx, bc.min_adx);
        return None;
    }
    let tp_mult = bc.tp_scale * (1.0 + adx / bc.tp_adx_divisor).max(1.0);
    let sl_mult = (1.0 + adx / bc.sl_adx_divisor).max(1.0);

    if let Some(extra) = input.extra.filter(|s| !s.is_empty()) {
        if trend.opposes(determine_short_term_trend(extra, &cfg.trend)) {
            tracing::debug!("[Breakout] short-term trend contradicts {}", trend);
            return None;
        }
    }

    let above = 1.0 + cfg.swing.snap_offset;
    let below = 1.0 - cfg.swing.snap_offset;
    let (action, tp, sl) = if trend == Trend::Upward && current > resistance * (1.0 + bc.percentage) {
        let tp = if refined_high > current {
            refined_high * above
        } else {
            current + atr * tp_mult
        };
        let sl = if refined_low < current {
            refined_low * below
        } else {
            current - atr * sl_mult
        };
        (Action::Buy, tp, sl)
    } else if trend == Trend::Downward && current < support * (1.0 - bc.percentage) {
        let tp = if refined_low < current {
            refined_low * below
        } else {
            current - atr * tp_mult
        };
        let sl = if refined_high > current {
            refined_high * above
        } else {
            current + atr * sl_mult
        };
        (Action::Sell, tp, sl)
    } else {
        return None;
    };

    Some(StrategySignal {
        action,
        entry: current,
        take_profit: tp,
        stop_loss: sl,
        trailing_stop: atr * sc.trailing_stop_multiplier,
        strategy: "Breakout".to_string(),
    })
}

/// Fast EMA above (golden) or below (death) the slow EMA by more than the configured gap.
fn ema_cross(input: &StrategyInput, cfg: &Config, action: Action) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let cc = &sc.cross;
    if input.primary.len() < sc.min_history {
        return None;
    }

    let required = match action {
        Action::Buy => Trend::Upward,
        Action::Sell => Trend::Downward,
    };
    if determine_trend(input.context, &cfg.trend) != required {
        return None;
    }

    let closes = input.primary.closes();
    let fast = last_ema(&closes, cc.fast_period)?;
    let slow = last_ema(&closes, cc.slow_period)?;
    let source = input.swing_source();
    let current = source.last_close()?;
    let atr = usable_atr(input.primary, sc)?;

    let crossed = match action {
        Action::Buy => fast > slow + cc.diff_threshold,
        Action::Sell => fast < slow - cc.diff_threshold,
    };
    if !crossed {
        return None;
    }

    let levels = SwingLevels::from_series(source, &cfg.swing);
    let entry = refined_entry(action, current, &levels, &cfg.swing);
    let (tp, sl) = swing_exits(action, entry, atr, cc.atr_multiplier, &levels, &cfg.swing);

    let strategy = match action {
        Action::Buy => "GoldenCross",
        Action::Sell => "DeathCross",
    };
    Some(StrategySignal {
        action,
        entry,
        take_profit: tp,
        stop_loss: sl,
        trailing_stop: atr * sc.trailing_stop_multiplier,
        strategy: strategy.to_string(),
    })
}

pub fn golden_cross(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    ema_cross(input, cfg, Action::Buy)
}

pub fn death_cross(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    ema_cross(input, cfg, Action::Sell)
}
