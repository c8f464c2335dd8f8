use crate::config::Config;
use crate::core::swings::project_next_swing;
use crate::core::trend::determine_trend;
use crate::models::{Action, Trend};

use super::levels::{last_ema, refine, usable_atr, SwingLevels};
use super::signals::{StrategyInput, StrategySignal};

/// Trade with the context trend from the projected fractal swing, once the EMAs have separated.
pub fn ema_fractal(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let fc = &sc.ema_fractal;
    if input.primary.len() < sc.min_history || input.context.len() < sc.min_history {
        return None;
    }

    let action = determine_trend(input.context, &cfg.trend).to_action()?;

    let closes = input.primary.closes();
    let fast = last_ema(&closes, fc.fast_period)?;
    let slow = last_ema(&closes, fc.slow_period)?;
    if slow == 0.0 || (fast - slow).abs() / slow < fc.min_gap {
        return None;
    }

    let atr = usable_atr(input.primary, sc)?;
    let source = input.swing_source();
    let current = source.last_close()?;
    let levels = SwingLevels::from_series(source, &cfg.swing);

    let (swings, snap) = match action {
        Action::Buy => (&levels.lows, 1.0 + cfg.swing.snap_offset),
        Action::Sell => (&levels.highs, 1.0 - cfg.swing.snap_offset),
    };
    let entry = project_next_swing(swings)
        .map(|p| refine(current, p, snap, &cfg.swing))
        .unwrap_or(current);

    let offset = atr * fc.atr_multiplier;
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
        strategy: "EMAFractal".to_string(),
    })
}
