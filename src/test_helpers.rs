use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::models::{Candle, CandleSeries};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Create candles from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let rows: Vec<(f64, f64, f64, f64, f64)> =
        data.iter().map(|&(o, h, l, c)| (o, h, l, c, 100.0)).collect();
    make_candles_with_volume(&rows)
}

/// Same as `make_candles` with an explicit volume per row.
pub fn make_candles_with_volume(data: &[(f64, f64, f64, f64, f64)]) -> CandleSeries {
    let base = base_time();
    let candles: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c, v))| Candle {
            timestamp: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: v,
        })
        .collect();

    CandleSeries::new(candles)
}

/// Candles whose open/high/low sit just around each given close.
pub fn make_closes(closes: &[f64]) -> CandleSeries {
    let rows: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let open = if i == 0 { c } else { closes[i - 1] };
            (open, open.max(c) * 1.001, open.min(c) * 0.999, c)
        })
        .collect();
    make_candles(&rows)
}

/// Create n rising (bullish) candles starting from `start` price.
pub fn make_bullish_trend(n: usize, start: f64) -> CandleSeries {
    let base = base_time();
    let candles: Vec<Candle> = (0..n)
        .map(|i| {
            let open = start + i as f64 * 10.0;
            let close = open + 8.0;
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: close + 2.0,
                low: open - 1.0,
                close,
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// Create n falling (bearish) candles starting from `start` price.
pub fn make_bearish_trend(n: usize, start: f64) -> CandleSeries {
    let base = base_time();
    let candles: Vec<Candle> = (0..n)
        .map(|i| {
            let open = start - i as f64 * 10.0;
            let close = open - 8.0;
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: open + 1.0,
                low: close - 2.0,
                close,
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// A Config suitable for testing: no symbols, temp data dir, quiet logging.
pub fn default_test_config() -> Config {
    let dir = std::env::temp_dir().join("consensus_bot_test");
    Config {
        data_dir: dir.to_string_lossy().to_string(),
        operations_file: dir
            .join("operations.csv")
            .to_string_lossy()
            .to_string(),
        signals_file: dir.join("signals.csv").to_string_lossy().to_string(),
        log_level: "ERROR".to_string(),
        ..Config::default()
    }
}

/// 1m-style series with two troughs (lows 94.9, 95.1) and two equal tops
/// (highs 100.1), closing at 95. Projects a low of 95.3 and a high of 100.1.
pub fn make_double_bottom() -> CandleSeries {
    let closes = [
        100.0, 99.0, 98.0, 97.0, 96.0, 95.0, 96.0, 97.0, 98.0, 99.0, 100.0, 99.0, 98.0, 97.0,
        96.0, 95.2, 96.0, 97.0, 98.0, 99.0, 100.0, 99.0, 98.0, 97.0, 96.0, 95.0,
    ];
    let rows: Vec<(f64, f64, f64, f64)> = closes.iter().map(|&c| (c, c + 0.1, c - 0.1, c)).collect();
    make_candles(&rows)
}
