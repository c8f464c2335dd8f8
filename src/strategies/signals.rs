use serde::{Deserialize, Serialize};

use crate::models::{Action, CandleSeries};

/// One evaluator's opinion for one instrument at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub action: Action,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Volatility-scaled distance, applied by whatever executes the trade.
    pub trailing_stop: f64,
    pub strategy: String,
}

impl StrategySignal {
    /// tp > entry > sl for a buy, tp < entry < sl for a sell.
    pub fn is_directionally_consistent(&self) -> bool {
        match self.action {
            Action::Buy => self.take_profit > self.entry && self.entry > self.stop_loss,
            Action::Sell => self.take_profit < self.entry && self.entry < self.stop_loss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedSignal {
    pub action: Action,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub trailing_stop: f64,
    /// Number of evaluators that agreed on `action`.
    pub score: usize,
    pub strategies: Vec<String>,
}

/// Candle series handed to every evaluator.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub primary: &'a CandleSeries,
    pub context: &'a CandleSeries,
    pub fine: Option<&'a CandleSeries>,
    pub extra: Option<&'a CandleSeries>,
}

impl<'a> StrategyInput<'a> {
    pub fn new(primary: &'a CandleSeries, context: &'a CandleSeries) -> Self {
        Self {
            primary,
            context,
            fine: None,
            extra: None,
        }
    }

    pub fn with_fine(mut self, fine: &'a CandleSeries) -> Self {
        self.fine = Some(fine);
        self
    }

    pub fn with_extra(mut self, extra: &'a CandleSeries) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Highest-resolution non-empty series, used for swing detection.
    pub fn swing_source(&self) -> &'a CandleSeries {
        match self.fine {
            Some(fine) if !fine.is_empty() => fine,
            _ => self.primary,
        }
    }
}
