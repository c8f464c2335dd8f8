use crate::trading::trade_record::Operation;

#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub symbol: String,
    pub strategy: String,

    // Performance
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,

    // Operations
    pub total_operations: usize,
    pub wins: usize,
    pub losses: usize,
    /// Fraction of operations with positive profit, 0 when there are none.
    pub win_rate: f64,
    pub avg_profit: f64,
    pub best_profit: f64,
    pub worst_profit: f64,
    pub profit_factor: f64,

    // Risk
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
}

impl BacktestReport {
    pub fn from_operations(
        symbol: &str,
        strategy: &str,
        operations: &[Operation],
        equity_curve: &[f64],
    ) -> Self {
        let initial_equity = equity_curve.first().copied().unwrap_or(0.0);
        let final_equity = equity_curve.last().copied().unwrap_or(initial_equity);
        let total_operations = operations.len();

        let profits: Vec<f64> = operations.iter().map(|op| op.profit).collect();
        let gains: f64 = profits.iter().filter(|p| **p > 0.0).sum();
        let drags: f64 = profits.iter().filter(|p| **p <= 0.0).sum();
        let wins = operations.iter().filter(|op| op.is_win()).count();
        let losses = total_operations - wins;

        let win_rate = if total_operations > 0 {
            wins as f64 / total_operations as f64
        } else {
            0.0
        };
        let avg_profit = if total_operations > 0 {
            profits.iter().sum::<f64>() / total_operations as f64
        } else {
            0.0
        };

        let profit_factor = if drags.abs() > 0.0 {
            gains / drags.abs()
        } else if wins > 0 {
            f64::INFINITY
        } else {
            0.0
        };

        let best_profit = profits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst_profit = profits.iter().copied().fold(f64::INFINITY, f64::min);

        let (max_drawdown, max_drawdown_pct) = max_drawdown(equity_curve);

        BacktestReport {
            symbol: symbol.to_string(),
            strategy: strategy.to_string(),
            initial_equity,
            final_equity,
            total_return_pct: if initial_equity > 0.0 {
                (final_equity - initial_equity) / initial_equity * 100.0
            } else {
                0.0
            },
            total_operations,
            wins,
            losses,
            win_rate,
            avg_profit,
            best_profit: if total_operations > 0 { best_profit } else { 0.0 },
            worst_profit: if total_operations > 0 { worst_profit } else { 0.0 },
            profit_factor,
            max_drawdown,
            max_drawdown_pct,
        }
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  BACKTEST {} / {}", self.symbol, self.strategy);
        println!("{}", "=".repeat(60));
        println!("  PERFORMANCE");
        println!("  ───────────────────────────────────");
        println!("  Initial:       {:.2}", self.initial_equity);
        println!("  Final:         {:.2}", self.final_equity);
        println!("  Return:        {:+.2}%", self.total_return_pct);
        println!();
        println!("  OPERATIONS");
        println!("  ───────────────────────────────────");
        println!("  Total:         {}", self.total_operations);
        println!("  Win/Loss:      {} / {}", self.wins, self.losses);
        println!("  Win Rate:      {:.1}%", self.win_rate * 100.0);
        println!("  Avg Profit:    {:+.4}", self.avg_profit);
        println!("  Best:          {:+.4}", self.best_profit);
        println!("  Worst:         {:+.4}", self.worst_profit);
        println!("  Profit Factor: {:.2}", self.profit_factor);
        println!();
        println!("  RISK");
        println!("  ───────────────────────────────────");
        println!(
            "  Max DD:        {:.2} ({:.1}%)",
            self.max_drawdown, self.max_drawdown_pct
        );
        println!("{}", "=".repeat(60));
    }
}

/// Largest peak-to-trough equity drop, absolute and as a percentage of the peak.
fn max_drawdown(equity_curve: &[f64]) -> (f64, f64) {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0f64;
    let mut max_dd_pct = 0.0f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        let dd = peak - equity;
        if dd > max_dd {
            max_dd = dd;
            max_dd_pct = if peak > 0.0 { dd / peak * 100.0 } else { 0.0 };
        }
    }
    (max_dd, max_dd_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn op(profit: f64) -> Operation {
        let now = Utc::now();
        Operation {
            symbol: "BTCUSDT".to_string(),
            entry_time: now,
            exit_time: now,
            entry_price: 100.0,
            exit_price: 100.0 * (1.0 + profit),
            profit,
            strategy: "Momo".to_string(),
            action: Action::Buy,
        }
    }

    #[test]
    fn empty_run() {
        let report = BacktestReport::from_operations("BTCUSDT", "Momo", &[], &[10_000.0]);
        assert_eq!(report.total_operations, 0);
        assert_eq!(report.win_rate, 0.0);
        assert_eq!(report.final_equity, 10_000.0);
        assert_eq!(report.profit_factor, 0.0);
        assert_eq!(report.best_profit, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
    }

    #[test]
    fn mixed_run() {
        let ops = [op(0.10), op(-0.05), op(0.02)];
        let curve = [10_000.0, 11_000.0, 10_450.0, 10_659.0];
        let report = BacktestReport::from_operations("BTCUSDT", "Momo", &ops, &curve);

        assert_eq!(report.wins, 2);
        assert_eq!(report.losses, 1);
        assert_relative_eq!(report.win_rate, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(report.profit_factor, 0.12 / 0.05, epsilon = 1e-9);
        assert_relative_eq!(report.best_profit, 0.10);
        assert_relative_eq!(report.worst_profit, -0.05);
        assert_relative_eq!(report.max_drawdown, 550.0, epsilon = 1e-9);
        assert_relative_eq!(report.max_drawdown_pct, 5.0, epsilon = 1e-9);
        assert_relative_eq!(report.total_return_pct, 6.59, epsilon = 1e-9);
    }

    #[test]
    fn only_winners_have_infinite_profit_factor() {
        let report =
            BacktestReport::from_operations("X", "Y", &[op(0.01)], &[100.0, 101.0]);
        assert!(report.profit_factor.is_infinite());
    }
}
