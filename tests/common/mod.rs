#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use consensus_signal_bot::config::Config;
use consensus_signal_bot::models::{Candle, CandleSeries};
use std::path::Path;

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Create candles from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let base = base_time();
    let candles: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle {
            timestamp: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        })
        .collect();

    CandleSeries::new(candles)
}

/// Candles that open at the previous close and wick 0.1% past the body.
pub fn make_closes(closes: &[f64]) -> CandleSeries {
    let rows: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let o = if i == 0 { c } else { closes[i - 1] };
            (o, o.max(c) * 1.001, o.min(c) * 0.999, c)
        })
        .collect();
    make_candles(&rows)
}

/// Create n rising (bullish) candles starting from `start` price.
pub fn make_bullish_trend(n: usize, start: f64) -> CandleSeries {
    let rows: Vec<(f64, f64, f64, f64)> = (0..n)
        .map(|i| {
            let open = start + i as f64 * 10.0;
            let close = open + 8.0;
            (open, close + 2.0, open - 1.0, close)
        })
        .collect();
    make_candles(&rows)
}

/// Create n falling (bearish) candles starting from `start` price.
pub fn make_bearish_trend(n: usize, start: f64) -> CandleSeries {
    let rows: Vec<(f64, f64, f64, f64)> = (0..n)
        .map(|i| {
            let open = start - i as f64 * 10.0;
            let close = open - 8.0;
            (open, open + 1.0, close - 2.0, close)
        })
        .collect();
    make_candles(&rows)
}

/// Default config with every file under `dir`.
pub fn test_config(dir: &Path) -> Config {
    Config {
        data_dir: dir.to_string_lossy().to_string(),
        operations_file: dir.join("operations.csv").to_string_lossy().to_string(),
        signals_file: dir.join("signals.csv").to_string_lossy().to_string(),
        log_level: "ERROR".to_string(),
        ..Config::default()
    }
}

/// Write a series in the cached-candle CSV layout.
pub fn write_series_csv(path: &Path, series: &CandleSeries) {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for c in series {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp.to_rfc3339(),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    std::fs::write(path, out).unwrap();
}
