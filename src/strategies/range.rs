use crate::config::Config;
use crate::core::indicators;
use crate::models::Action;

use super::levels::{
    last_adx, last_atr, last_stoch_rsi, refine, refined_entry, swing_exits, usable_atr,
    SwingLevels,
};
use super::signals::{StrategyInput, StrategySignal};

/// Fade the edges of a quiet range: low ADX, mid-band RSI, ordinary volume.
pub fn range_trading(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let rc = &sc.range;
    if input.primary.len() < sc.min_history || input.context.len() < sc.min_history {
        return None;
    }

    let adx = last_adx(input.primary, sc)?;
    if adx > rc.max_adx {
        return None;
    }
    let rsi = indicators::last(&indicators::rsi(&input.primary.closes(), sc.rsi_period))?;
    if rsi < rc.rsi_low || rsi > rc.rsi_high {
        return None;
    }

    let volumes = input.primary.volumes();
    let vol_avg = indicators::last(&indicators::sma(&volumes, rc.volume_period))?;
    let vol = volumes.last().copied()?;
    if vol < vol_avg / rc.volume_multiplier || vol > vol_avg * rc.volume_multiplier {
        tracing::debug!("[RangeTrading] volume {:.2} outside band around {:.2}", vol, vol_avg);
        return None;
    }

    let source = input.swing_source();
    let current = source.last_close()?;
    let levels = SwingLevels::from_series(source, &cfg.swing);
    let support = levels
        .projected_low
        .map(|pl| refine(current, pl, 1.0, &cfg.swing))
        .unwrap_or_else(|| source.lows_min());
    let resistance = levels
        .projected_high
        .map(|ph| refine(current, ph, 1.0, &cfg.swing))
        .unwrap_or_else(|| source.highs_max());

    let atr = usable_atr(input.primary, sc)?;

    let action = if current <= support * (1.0 + rc.touch_band) {
        Action::Buy
    } else if current >= resistance * (1.0 - rc.touch_band) {
        Action::Sell
    } else {
        return None;
    };
    let (take_profit, stop_loss) = swing_exits(action, current, atr, 1.0, &levels, &cfg.swing);

    Some(StrategySignal {
        action,
        entry: current,
        take_profit,
        stop_loss,
        trailing_stop: atr * sc.trailing_stop_multiplier,
        strategy: "RangeTrading".to_string(),
    })
}

/// StochRSI extremes during outsized volatility (ATR a large fraction of price).
pub fn big_move_stoch_rsi(input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
    let sc = &cfg.strategy;
    let bc = &sc.big_move;
    if input.primary.len() < sc.min_history || input.context.len() < sc.min_history {
        return None;
    }

    let source = input.swing_source();
    let current = source.last_close()?;
    let atr = last_atr(input.primary, sc)?;
    if current <= 0.0 || atr / current < bc.min_atr_ratio {
        return None;
    }

    let stoch = last_stoch_rsi(input.primary, sc)?;
    let action = if stoch < bc.stoch_buy {
        Action::Buy
    } else if stoch > bc.stoch_sell {
        Action::Sell
    } else {
        return None;
    };

    let levels = SwingLevels::from_series(source, &cfg.swing);
    let entry = refined_entry(action, current, &levels, &cfg.swing);
    let (take_profit, stop_loss) =
        swing_exits(action, entry, atr, bc.atr_multiplier, &levels, &cfg.swing);

    Some(StrategySignal {
        action,
        entry,
        take_profit,
        stop_loss,
        trailing_stop: atr * sc.trailing_stop_multiplier,
        strategy: "BigMoveStochRSI".to_string(),
    })
}
