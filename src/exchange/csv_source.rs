use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::BotError;
use crate::exchange::CandleSource;
use crate::models::{Candle, CandleSeries, Timeframe};

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` with or without a `+HH:MM` offset, or epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    s.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// Candle series cached on disk as `{dir}/{symbol}_{timeframe}.csv`.
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str, tf: Timeframe) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", symbol, tf))
    }

    /// Read, sort and de-duplicate one cached series.
    pub fn load_series(&self, symbol: &str, tf: Timeframe) -> Result<CandleSeries, BotError> {
        let path = self.path_for(symbol, tf);
        let mut reader = csv::Reader::from_path(&path)?;
        let mut candles = Vec::new();

        for (line, row) in reader.deserialize::<CandleRow>().enumerate() {
            let row = row?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| BotError::InvalidRow {
                path: path.display().to_string(),
                reason: format!("line {}: bad timestamp {:?}", line + 2, row.timestamp),
            })?;
            candles.push(Candle {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        let series = CandleSeries::from_unsorted(candles);
        debug!("loaded {} {} candles for {}", series.len(), tf, symbol);
        Ok(series)
    }

    /// Symbols with a cached primary-timeframe file, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, BotError> {
        let suffix = format!("_{}.csv", Timeframe::PRIMARY);
        let mut symbols: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| name.strip_suffix(&suffix).map(str::to_string))
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch_series(&self, symbol: &str, tf: Timeframe) -> Result<CandleSeries> {
        self.load_series(symbol, tf)
            .with_context(|| format!("loading {} {} from {}", symbol, tf, self.dir.display()))
    }
}
