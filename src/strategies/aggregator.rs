use std::collections::HashSet;

use crate::config::ConsensusConfig;
use crate::models::Action;

use super::signals::{ConsolidatedSignal, StrategySignal};

/// Reconcile one instant's strategy signals into a consensus signal.
///
/// The winning action is the most frequent one (first seen wins a tie) and
/// must be backed by at least `min_agreeing` signals. Levels are averaged over
/// the winning signals only.
pub fn aggregate(signals: &[StrategySignal], cfg: &ConsensusConfig) -> Option<ConsolidatedSignal> {
    let candidates: Vec<&StrategySignal> = if cfg.validate_direction {
        signals
            .iter()
            .filter(|s| {
                let ok = s.is_directionally_consistent();
                if !ok {
                    tracing::debug!("[AGG] dropping inconsistent {} {} signal", s.strategy, s.action);
                }
                ok
            })
            .collect()
    } else {
        signals.iter().collect()
    };
    if candidates.is_empty() {
        return None;
    }

    let mut tally: Vec<(Action, usize)> = Vec::new();
    for s in &candidates {
        match tally.iter_mut().find(|(a, _)| *a == s.action) {
            Some((_, count)) => *count += 1,
            None => tally.push((s.action, 1)),
        }
    }
    let (action, count) = tally
        .iter()
        .copied()
        .fold(None, |best: Option<(Action, usize)>, (a, c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((a, c)),
        })?;
    if count < cfg.min_agreeing.max(1) {
        return None;
    }

    let winners: Vec<&StrategySignal> = candidates.into_iter().filter(|s| s.action == action).collect();
    let n = winners.len() as f64;
    let mean = |f: fn(&StrategySignal) -> f64| winners.iter().map(|s| f(s)).sum::<f64>() / n;

    let mut seen = HashSet::new();
    let strategies: Vec<String> = winners
        .iter()
        .filter(|s| seen.insert(s.strategy.as_str()))
        .map(|s| s.strategy.clone())
        .collect();

    Some(ConsolidatedSignal {
        action,
        entry: mean(|s| s.entry),
        take_profit: mean(|s| s.take_profit),
        stop_loss: mean(|s| s.stop_loss),
        trailing_stop: mean(|s| s.trailing_stop),
        score: count,
        strategies,
    })
}
