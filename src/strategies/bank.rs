use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;

use super::signals::{StrategyInput, StrategySignal};
use super::{fractal, momentum, range, reversion, trend};

/// The fixed set of rule-based evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Breakout,
    GoldenCross,
    DeathCross,
    #[serde(rename = "Fib_MACD")]
    FibMacd,
    #[serde(rename = "HeikinAshi_EMA")]
    HeikinAshiEma,
    BollingerReversion,
    Momo,
    #[serde(rename = "StochRSI_MACD")]
    StochRsiMacd,
    #[serde(rename = "TripleEMA_StochRSI_ATR")]
    TripleEmaStochRsi,
    RangeTrading,
    #[serde(rename = "BigMoveStochRSI")]
    BigMoveStochRsi,
    #[serde(rename = "EMAFractal")]
    EmaFractal,
}

impl StrategyKind {
    /// Evaluators enabled unless configured otherwise, in evaluation order.
    pub const CORE: [StrategyKind; 11] = [
        StrategyKind::Breakout,
        StrategyKind::GoldenCross,
        StrategyKind::DeathCross,
        StrategyKind::FibMacd,
        StrategyKind::HeikinAshiEma,
        StrategyKind::BollingerReversion,
        StrategyKind::Momo,
        StrategyKind::StochRsiMacd,
        StrategyKind::TripleEmaStochRsi,
        StrategyKind::RangeTrading,
        StrategyKind::BigMoveStochRsi,
    ];

    pub const ALL: [StrategyKind; 12] = [
        StrategyKind::Breakout,
        StrategyKind::GoldenCross,
        StrategyKind::DeathCross,
        StrategyKind::FibMacd,
        StrategyKind::HeikinAshiEma,
        StrategyKind::BollingerReversion,
        StrategyKind::Momo,
        StrategyKind::StochRsiMacd,
        StrategyKind::TripleEmaStochRsi,
        StrategyKind::RangeTrading,
        StrategyKind::BigMoveStochRsi,
        StrategyKind::EmaFractal,
    ];

    /// Identifier carried in signals and operation records.
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::Breakout => "Breakout",
            StrategyKind::GoldenCross => "GoldenCross",
            StrategyKind::DeathCross => "DeathCross",
            StrategyKind::FibMacd => "Fib_MACD",
            StrategyKind::HeikinAshiEma => "HeikinAshi_EMA",
            StrategyKind::BollingerReversion => "BollingerReversion",
            StrategyKind::Momo => "Momo",
            StrategyKind::StochRsiMacd => "StochRSI_MACD",
            StrategyKind::TripleEmaStochRsi => "TripleEMA_StochRSI_ATR",
            StrategyKind::RangeTrading => "RangeTrading",
            StrategyKind::BigMoveStochRsi => "BigMoveStochRSI",
            StrategyKind::EmaFractal => "EMAFractal",
        }
    }

    /// Case-insensitive lookup by identifier.
    pub fn from_id(id: &str) -> Option<StrategyKind> {
        let id = id.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.id().eq_ignore_ascii_case(id))
    }

    pub fn evaluate(self, input: &StrategyInput, cfg: &Config) -> Option<StrategySignal> {
        match self {
            StrategyKind::Breakout => trend::breakout(input, cfg),
            StrategyKind::GoldenCross => trend::golden_cross(input, cfg),
            StrategyKind::DeathCross => trend::death_cross(input, cfg),
            StrategyKind::FibMacd => reversion::fib_macd(input, cfg),
            StrategyKind::HeikinAshiEma => reversion::heikin_ashi_ema(input, cfg),
            StrategyKind::BollingerReversion => reversion::bollinger_reversion(input, cfg),
            StrategyKind::Momo => momentum::momo(input, cfg),
            StrategyKind::StochRsiMacd => momentum::stoch_rsi_macd(input, cfg),
            StrategyKind::TripleEmaStochRsi => momentum::triple_ema_stoch_rsi(input, cfg),
            StrategyKind::RangeTrading => range::range_trading(input, cfg),
            StrategyKind::BigMoveStochRsi => range::big_move_stoch_rsi(input, cfg),
            StrategyKind::EmaFractal => fractal::ema_fractal(input, cfg),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Runs the enabled evaluators over one set of series.
pub struct StrategyBank {
    kinds: Vec<StrategyKind>,
}

impl StrategyBank {
    pub fn new(kinds: Vec<StrategyKind>) -> Self {
        Self { kinds }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.strategy.enabled.clone())
    }

    pub fn kinds(&self) -> &[StrategyKind] {
        &self.kinds
    }

    /// Signals in evaluator order; evaluators that abstain contribute nothing.
    pub fn evaluate(&self, input: &StrategyInput, cfg: &Config) -> Vec<StrategySignal> {
        self.kinds
            .iter()
            .filter_map(|kind| {
                let signal = kind.evaluate(input, cfg);
                if let Some(s) = &signal {
                    tracing::debug!(
                        "[BANK] {} -> {} entry={:.6} tp={:.6} sl={:.6}",
                        kind,
                        s.action,
                        s.entry,
                        s.take_profit,
                        s.stop_loss
                    );
                }
                signal
            })
            .collect()
    }
}
