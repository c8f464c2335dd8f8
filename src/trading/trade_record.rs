use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Action;
use crate::strategies::ConsolidatedSignal;

/// A closed simulated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub symbol: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Fractional return net of commission.
    pub profit: f64,
    pub strategy: String,
    pub action: Action,
}

impl Operation {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }
}

/// One row of the signal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalLogRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: Action,
    pub entry: f64,
    pub tp: f64,
    pub sl: f64,
    pub trailing_stop: f64,
    pub position_size: f64,
    pub percentage_risk: f64,
    pub score: usize,
    /// Contributing strategies joined with ','.
    pub strategies: String,
}

impl SignalLogRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        symbol: &str,
        signal: &ConsolidatedSignal,
        position_size: f64,
        percentage_risk: f64,
    ) -> Self {
        Self {
            timestamp,
            symbol: symbol.to_string(),
            action: signal.action,
            entry: signal.entry,
            tp: signal.take_profit,
            sl: signal.stop_loss,
            trailing_stop: signal.trailing_stop,
            position_size,
            percentage_risk,
            score: signal.score,
            strategies: signal.strategies.join(","),
        }
    }

    pub fn strategy_list(&self) -> Vec<&str> {
        self.strategies.split(',').filter(|s| !s.is_empty()).collect()
    }
}
