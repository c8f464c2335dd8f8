use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Action, CandleSeries};
use crate::strategies::{StrategyInput, StrategyKind, StrategySignal};
use crate::trading::record_store::CsvTable;
use crate::trading::trade_record::Operation;

use super::report::BacktestReport;

/// The series one simulation walks over. Only `primary` drives the index.
#[derive(Debug, Clone, Default)]
pub struct BacktestData {
    pub primary: CandleSeries,
    pub context: CandleSeries,
    pub fine: Option<CandleSeries>,
    pub extra: Option<CandleSeries>,
}

impl BacktestData {
    pub fn new(primary: CandleSeries, context: CandleSeries) -> Self {
        Self {
            primary,
            context,
            fine: None,
            extra: None,
        }
    }

    /// Every series cut to its first `i + 1` bars. Auxiliary series shorter
    /// than that are passed whole.
    fn prefix(&self, i: usize) -> BacktestData {
        let n = i + 1;
        BacktestData {
            primary: self.primary.head(n),
            context: self.context.head(n),
            fine: self.fine.as_ref().map(|s| s.head(n)),
            extra: self.extra.as_ref().map(|s| s.head(n)),
        }
    }

    fn input(&self) -> StrategyInput<'_> {
        StrategyInput {
            primary: &self.primary,
            context: &self.context,
            fine: self.fine.as_ref().filter(|s| !s.is_empty()),
            extra: self.extra.as_ref().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    InPosition {
        action: Action,
        entry_price: f64,
        entry_time: DateTime<Utc>,
        take_profit: f64,
        strategy: String,
    },
}

#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub operations: Vec<Operation>,
    /// Starts at the initial equity, one extra point per closed operation.
    pub equity_curve: Vec<f64>,
    pub report: BacktestReport,
}

/// Walks a single instrument bar by bar with one strategy function.
///
/// A position opens on the first signal seen while flat and closes only when
/// the close reaches the take-profit captured at entry. Stop-loss and trailing
/// stop are carried on signals but never exit a simulated position.
pub struct Simulator {
    symbol: String,
    config: Config,
    record: Option<Arc<CsvTable<Operation>>>,
}

impl Simulator {
    pub fn new(symbol: &str, config: Config) -> Self {
        Self {
            symbol: symbol.to_string(),
            config,
            record: None,
        }
    }

    /// Append closed operations to a shared record after each run.
    pub fn with_record(mut self, record: Arc<CsvTable<Operation>>) -> Self {
        self.record = Some(record);
        self
    }

    pub fn run_strategy(&self, data: &BacktestData, kind: StrategyKind) -> BacktestOutcome {
        self.run(data, kind.id(), |input| kind.evaluate(input, &self.config))
    }

    pub fn run<F>(&self, data: &BacktestData, label: &str, strategy: F) -> BacktestOutcome
    where
        F: Fn(&StrategyInput) -> Option<StrategySignal>,
    {
        let bt = &self.config.backtest;
        let mut equity_curve = vec![bt.initial_equity];
        let mut operations = Vec::new();
        let mut state = PositionState::Flat;

        info!(
            "Backtest {} / {}: {} primary bars, warm-up {}",
            self.symbol,
            label,
            data.primary.len(),
            bt.warmup
        );

        for i in bt.warmup..data.primary.len() {
            let window = data.prefix(i);
            let Some(bar) = window.primary.last() else {
                continue;
            };
            let (price, now) = (bar.close, bar.timestamp);

            // The strategy is only consulted while flat; an open position
            // is checked against its take-profit on every bar.
            if state == PositionState::Flat {
                let Some(signal) = strategy(&window.input()) else {
                    continue;
                };
                debug!(
                    "[BT {}] open {} at {:.6} (tp {:.6}) by {}",
                    now.format("%m-%d %H:%M"),
                    signal.action,
                    signal.entry,
                    signal.take_profit,
                    signal.strategy
                );
                state = PositionState::InPosition {
                    action: signal.action,
                    entry_price: signal.entry,
                    entry_time: now,
                    take_profit: signal.take_profit,
                    strategy: signal.strategy,
                };
            }

            if let Some(op) = self.try_close(&state, price, now) {
                debug!(
                    "[BT {}] close {} at {:.6} profit {:+.4}",
                    now.format("%m-%d %H:%M"),
                    op.action,
                    op.exit_price,
                    op.profit
                );
                let last = equity_curve.last().copied().unwrap_or(bt.initial_equity);
                equity_curve.push(last * (1.0 + op.profit));
                operations.push(op);
                state = PositionState::Flat;
            }
        }

        if let Some(record) = &self.record {
            record.append_or_warn(&operations);
        }

        let report =
            BacktestReport::from_operations(&self.symbol, label, &operations, &equity_curve);
        info!(
            "Backtest {} / {} done: {} operations, win rate {:.1}%, final equity {:.2}",
            self.symbol,
            label,
            report.total_operations,
            report.win_rate * 100.0,
            report.final_equity
        );

        BacktestOutcome {
            operations,
            equity_curve,
            report,
        }
    }

    fn try_close(&self, state: &PositionState, price: f64, now: DateTime<Utc>) -> Option<Operation> {
        let PositionState::InPosition {
            action,
            entry_price,
            entry_time,
            take_profit,
            strategy,
        } = state
        else {
            return None;
        };

        let (hit, change) = match action {
            Action::Buy => (price >= *take_profit, price - entry_price),
            Action::Sell => (price <= *take_profit, entry_price - price),
        };
        if !hit || *entry_price == 0.0 {
            return None;
        }

        Some(Operation {
            symbol: self.symbol.clone(),
            entry_time: *entry_time,
            exit_time: now,
            entry_price: *entry_price,
            exit_price: price,
            profit: change / entry_price - self.config.backtest.commission,
            strategy: strategy.clone(),
            action: *action,
        })
    }
}
