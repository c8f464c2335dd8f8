use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::strategies::StrategyKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingConfig {
    /// Candles on each side a swing must strictly dominate.
    pub window: usize,
    /// Only the most recent `limit_candles` rows are scanned for swings.
    pub limit_candles: Option<usize>,
    /// Relative distance above which an entry only steps part of the way toward a projection.
    pub refine_threshold: f64,
    pub refine_ratio: f64,
    /// Offset applied when an entry/level snaps to a projected swing (0.002 = 0.2%).
    pub snap_offset: f64,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            window: 5,
            limit_candles: Some(120),
            refine_threshold: 0.02,
            refine_ratio: 0.5,
            snap_offset: 0.002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    pub lookback: usize,
    pub band: f64,
    pub short_lookback: usize,
    pub short_band: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            lookback: 10,
            band: 0.005,
            short_lookback: 5,
            short_band: 0.002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutConfig {
    pub percentage: f64,
    pub min_adx: f64,
    pub tp_scale: f64,
    pub tp_adx_divisor: f64,
    pub sl_adx_divisor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Absolute EMA separation required to call a cross.
    pub diff_threshold: f64,
    pub atr_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FibMacdConfig {
    pub lookback: usize,
    pub retracement: f64,
    pub distance_threshold: f64,
    pub macd_diff_threshold: f64,
    /// Maximum relative distance between price and the projected swing low.
    pub proximity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeikinAshiConfig {
    pub ema_period: usize,
    pub min_adx: f64,
    pub ema_band: f64,
    pub proximity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerConfig {
    pub period: usize,
    pub std_multiplier: f64,
    pub lower_multiplier: f64,
    pub upper_multiplier: f64,
    pub tp_sl_offset: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    pub stoch_buy: f64,
    pub stoch_sell: f64,
    pub max_adx: f64,
    pub volume_period: usize,
    pub volume_multiplier: f64,
    pub momo_atr_multiplier: f64,
    pub stoch_macd_atr_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripleEmaConfig {
    pub short_period: usize,
    pub mid_period: usize,
    pub long_period: usize,
    pub min_gap: f64,
    pub stoch_buy: f64,
    pub stoch_sell: f64,
    pub extreme_lookback: usize,
    pub extreme_band: f64,
    pub atr_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    pub max_adx: f64,
    pub rsi_low: f64,
    pub rsi_high: f64,
    pub volume_period: usize,
    pub volume_multiplier: f64,
    /// Tolerance around support/resistance that still counts as a touch.
    pub touch_band: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigMoveConfig {
    /// Minimum ATR as a fraction of price.
    pub min_atr_ratio: f64,
    pub stoch_buy: f64,
    pub stoch_sell: f64,
    pub atr_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaFractalConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub min_gap: f64,
    pub atr_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub enabled: Vec<StrategyKind>,
    pub min_history: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub rsi_period: usize,
    pub stoch_rsi_period: usize,
    pub stoch_rsi_fastk: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub atr_min: f64,
    pub trailing_stop_multiplier: f64,
    /// ATR multiple for the buy take profit when no swing high projects.
    pub tp_atr_offset: f64,
    /// Sell take profit as a fraction of the projected swing high.
    pub anchored_sell_tp: f64,

    pub breakout: BreakoutConfig,
    pub cross: CrossConfig,
    pub fib_macd: FibMacdConfig,
    pub heikin_ashi: HeikinAshiConfig,
    pub bollinger: BollingerConfig,
    pub momentum: MomentumConfig,
    pub triple_ema: TripleEmaConfig,
    pub range: RangeConfig,
    pub big_move: BigMoveConfig,
    pub ema_fractal: EmaFractalConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            enabled: StrategyKind::CORE.to_vec(),
            min_history: 40,
            atr_period: 14,
            adx_period: 14,
            rsi_period: 14,
            stoch_rsi_period: 14,
            stoch_rsi_fastk: 5,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_min: 5e-8,
            trailing_stop_multiplier: 2.0,
            tp_atr_offset: 0.5,
            anchored_sell_tp: 0.997,
            breakout: BreakoutConfig {
                percentage: 0.015,
                min_adx: 25.0,
                tp_scale: 0.8,
                tp_adx_divisor: 50.0,
                sl_adx_divisor: 75.0,
            },
            cross: CrossConfig {
                fast_period: 20,
                slow_period: 50,
                diff_threshold: 0.007,
                atr_multiplier: 1.0,
            },
            fib_macd: FibMacdConfig {
                lookback: 40,
                retracement: 0.618,
                distance_threshold: 0.015,
                macd_diff_threshold: 0.01,
                proximity: 0.01,
            },
            heikin_ashi: HeikinAshiConfig {
                ema_period: 20,
                min_adx: 25.0,
                ema_band: 0.02,
                proximity: 0.01,
            },
            bollinger: BollingerConfig {
                period: 20,
                std_multiplier: 2.0,
                lower_multiplier: 0.998,
                upper_multiplier: 1.002,
                tp_sl_offset: 1.5,
            },
            momentum: MomentumConfig {
                stoch_buy: 0.05,
                stoch_sell: 0.95,
                max_adx: 25.0,
                volume_period: 20,
                volume_multiplier: 1.5,
                momo_atr_multiplier: 0.8,
                stoch_macd_atr_multiplier: 0.7,
            },
            triple_ema: TripleEmaConfig {
                short_period: 10,
                mid_period: 20,
                long_period: 50,
                min_gap: 0.01,
                stoch_buy: 0.10,
                stoch_sell: 0.90,
                extreme_lookback: 40,
                extreme_band: 0.005,
                atr_multiplier: 0.75,
            },
            range: RangeConfig {
                max_adx: 20.0,
                rsi_low: 40.0,
                rsi_high: 60.0,
                volume_period: 10,
                volume_multiplier: 1.2,
                touch_band: 0.001,
            },
            big_move: BigMoveConfig {
                min_atr_ratio: 0.04,
                stoch_buy: 0.05,
                stoch_sell: 0.95,
                atr_multiplier: 1.2,
            },
            ema_fractal: EmaFractalConfig {
                fast_period: 20,
                slow_period: 50,
                min_gap: 0.01,
                atr_multiplier: 0.8,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    pub min_agreeing: usize,
    /// Drop signals whose tp/sl sit on the wrong side of entry before tallying.
    pub validate_direction: bool,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            min_agreeing: 2,
            validate_direction: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub initial_capital: f64,
    /// Fraction of capital put at risk per trade.
    pub risk_fraction: f64,
    pub leverage: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            initial_capital: 27.0,
            risk_fraction: 0.02,
            leverage: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_equity: f64,
    pub warmup: usize,
    /// Round-trip cost subtracted from every closed operation's return.
    pub commission: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_equity: 10_000.0,
            warmup: 50,
            commission: 0.0018,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub symbols: Vec<String>,
    pub data_dir: String,
    pub operations_file: String,
    pub signals_file: String,
    /// Primary bars required before an instrument is evaluated live.
    pub min_primary_bars: usize,

    pub swing: SwingConfig,
    pub trend: TrendConfig,
    pub strategy: StrategyConfig,
    pub consensus: ConsensusConfig,
    pub risk: RiskConfig,
    pub backtest: BacktestConfig,

    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            data_dir: "data".to_string(),
            operations_file: "backtesting_results.csv".to_string(),
            signals_file: "signals_log.csv".to_string(),
            min_primary_bars: 50,
            swing: SwingConfig::default(),
            trend: TrendConfig::default(),
            strategy: StrategyConfig::default(),
            consensus: ConsensusConfig::default(),
            risk: RiskConfig::default(),
            backtest: BacktestConfig::default(),
            log_level: "INFO".to_string(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut cfg = Config::default();

        if let Some(v) = env_parse("INITIAL_CAPITAL") {
            cfg.risk.initial_capital = v;
        }
        if let Some(v) = env_parse("RISK_PER_TRADE") {
            cfg.risk.risk_fraction = v;
        }
        if let Some(v) = env_parse("LEVERAGE") {
            cfg.risk.leverage = v;
        }
        if let Some(v) = env_parse("COMMISSION") {
            cfg.backtest.commission = v;
        }
        if let Some(v) = env_parse("MIN_CONSENSUS") {
            cfg.consensus.min_agreeing = v;
        }
        if let Some(v) = env_parse("VALIDATE_DIRECTION") {
            cfg.consensus.validate_direction = v;
        }
        if let Some(v) = env_parse("SWING_WINDOW") {
            cfg.swing.window = v;
        }
        if let Some(v) = env_parse::<usize>("SWING_LIMIT_CANDLES") {
            cfg.swing.limit_candles = if v == 0 { None } else { Some(v) };
        }
        if let Some(symbols) = env_list("SYMBOLS") {
            cfg.symbols = symbols;
        }
        if let Some(ids) = env_list("ENABLED_STRATEGIES") {
            let kinds: Vec<StrategyKind> =
                ids.iter().filter_map(|id| StrategyKind::from_id(id)).collect();
            if !kinds.is_empty() {
                cfg.strategy.enabled = kinds;
            }
        }
        if let Ok(v) = std::env::var("DATA_DIR") {
            cfg.data_dir = v;
        }
        if let Ok(v) = std::env::var("OPERATIONS_FILE") {
            cfg.operations_file = v;
        }
        if let Ok(v) = std::env::var("SIGNALS_FILE") {
            cfg.signals_file = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            cfg.log_level = v;
        }

        cfg
    }
}
