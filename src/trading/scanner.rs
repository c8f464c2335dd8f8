use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::risk::RiskSizer;
use crate::error::BotError;
use crate::exchange::CandleSource;
use crate::models::{CandleSeries, Timeframe};
use crate::strategies::{aggregate, StrategyBank, StrategyInput};
use crate::trading::notifier::{Notifier, SignalAlert};
use crate::trading::record_store::CsvTable;
use crate::trading::trade_record::SignalLogRecord;

/// Live path: fetch, evaluate, reconcile, size and announce, one instrument at a time.
pub struct Scanner {
    config: Config,
    source: Box<dyn CandleSource>,
    notifier: Box<dyn Notifier>,
    bank: StrategyBank,
    sizer: RiskSizer,
    signal_log: Option<CsvTable<SignalLogRecord>>,
}

impl Scanner {
    pub fn new(config: Config, source: Box<dyn CandleSource>, notifier: Box<dyn Notifier>) -> Self {
        let bank = StrategyBank::from_config(&config);
        let sizer = RiskSizer::new(&config.risk);
        let signal_log = Some(CsvTable::new(&config.signals_file));
        Self {
            config,
            source,
            notifier,
            bank,
            sizer,
            signal_log,
        }
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.sizer = self.sizer.with_capital(capital);
        self
    }

    pub fn without_signal_log(mut self) -> Self {
        self.signal_log = None;
        self
    }

    async fn required(&self, symbol: &str, tf: Timeframe) -> Option<CandleSeries> {
        match self.source.fetch_series(symbol, tf).await {
            Ok(series) if !series.is_empty() => Some(series),
            Ok(_) => {
                warn!("{}: no {} candles", symbol, tf);
                None
            }
            Err(e) => {
                warn!("{}: {} data unavailable: {:#}", symbol, tf, e);
                None
            }
        }
    }

    async fn optional(&self, symbol: &str, tf: Timeframe) -> Option<CandleSeries> {
        self.source
            .fetch_series(symbol, tf)
            .await
            .ok()
            .filter(|s| !s.is_empty())
    }

    /// Consensus alert for one instrument, or `None` when data is short or the evaluators disagree.
    pub async fn evaluate_symbol(&self, symbol: &str) -> Option<SignalAlert> {
        let primary = self.required(symbol, Timeframe::PRIMARY).await?;
        let context = self.required(symbol, Timeframe::CONTEXT).await?;
        if primary.len() < self.config.min_primary_bars {
            let e = BotError::InsufficientData {
                symbol: symbol.to_string(),
                timeframe: Timeframe::PRIMARY.to_string(),
                bars: primary.len(),
                minimum: self.config.min_primary_bars,
            };
            warn!("{}", e);
            return None;
        }
        let fine = self.optional(symbol, Timeframe::FINE).await;
        let extra = self.optional(symbol, Timeframe::EXTRA).await;

        let input = StrategyInput {
            primary: &primary,
            context: &context,
            fine: fine.as_ref(),
            extra: extra.as_ref(),
        };
        let signals = self.bank.evaluate(&input, &self.config);
        let consolidated = aggregate(&signals, &self.config.consensus)?;

        let position_size = self.sizer.size(consolidated.entry, consolidated.stop_loss);
        let percentage_risk = self
            .sizer
            .percentage_risk(consolidated.entry, consolidated.stop_loss);
        Some(SignalAlert {
            symbol: symbol.to_string(),
            signal: consolidated,
            position_size,
            percentage_risk,
        })
    }

    /// One pass over `symbols`; alerts are forwarded and logged as they are produced.
    pub async fn scan(&self, symbols: &[String]) -> Vec<SignalAlert> {
        let mut alerts = Vec::new();
        for symbol in symbols {
            info!("Evaluating {}", symbol);
            let Some(alert) = self.evaluate_symbol(symbol).await else {
                continue;
            };

            if let Err(e) = self.notifier.notify(&alert).await {
                warn!("{}: notification failed: {:#}", symbol, e);
            }
            if let Some(log) = &self.signal_log {
                let record = SignalLogRecord::new(
                    Utc::now(),
                    symbol,
                    &alert.signal,
                    alert.position_size,
                    alert.percentage_risk,
                );
                log.append_or_warn(&[record]);
            }
            info!(
                "Signal for {}: {} (score {}, strategies {:?})",
                symbol, alert.signal.action, alert.signal.score, alert.signal.strategies
            );
            alerts.push(alert);
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::HistoricalSource;
    use crate::models::Action;
    use crate::strategies::StrategyKind;
    use crate::test_helpers::{default_test_config, make_bullish_trend};
    use crate::trading::notifier::LogNotifier;
    use approx::assert_relative_eq;

    fn uptrend_source(bars: usize) -> HistoricalSource {
        let series = make_bullish_trend(bars, 100.0);
        HistoricalSource::new()
            .with_series("BTCUSDT", Timeframe::PRIMARY, &series)
            .with_series("BTCUSDT", Timeframe::CONTEXT, &series)
    }

    #[tokio::test]
    async fn golden_cross_and_fractal_reach_consensus() {
        let mut cfg = default_test_config();
        cfg.strategy.enabled = StrategyKind::ALL.to_vec();
        let scanner = Scanner::new(cfg, Box::new(uptrend_source(60)), Box::new(LogNotifier))
            .without_signal_log();

        let alert = scanner.evaluate_symbol("BTCUSDT").await.unwrap();
        assert_eq!(alert.signal.action, Action::Buy);
        assert_eq!(alert.signal.score, 2);
        assert_relative_eq!(alert.signal.entry, 698.0, epsilon = 1e-9);
        assert_relative_eq!(alert.signal.take_profit, 708.8, epsilon = 1e-9);
        assert_relative_eq!(alert.signal.stop_loss, 687.2, epsilon = 1e-9);
        // 27 * 0.02 / 10.8 * 10
        assert_relative_eq!(alert.position_size, 0.5, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn lone_signal_is_not_enough() {
        let scanner = Scanner::new(
            default_test_config(),
            Box::new(uptrend_source(60)),
            Box::new(LogNotifier),
        )
        .without_signal_log();
        assert!(scanner.evaluate_symbol("BTCUSDT").await.is_none());
    }

    #[tokio::test]
    async fn short_or_missing_data_is_skipped() {
        let scanner = Scanner::new(
            default_test_config(),
            Box::new(uptrend_source(45)),
            Box::new(LogNotifier),
        )
        .without_signal_log();
        assert!(scanner.evaluate_symbol("BTCUSDT").await.is_none());
        assert!(scanner.evaluate_symbol("ETHUSDT").await.is_none());
        assert!(scanner.scan(&["ETHUSDT".to_string()]).await.is_empty());
    }
}
