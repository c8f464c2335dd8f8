use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::exchange::CandleSource;
use crate::models::{Candle, CandleSeries, Timeframe};

/// A CandleSource that replays pre-loaded candles.
/// An optional cursor (`now`) hides candles after it, simulating a forward walk.
#[derive(Default)]
pub struct HistoricalSource {
    data: HashMap<(String, Timeframe), Vec<Candle>>,
    now: Option<DateTime<Utc>>,
}

impl HistoricalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load candles for one symbol and timeframe. Order does not matter.
    pub fn load(&mut self, symbol: &str, tf: Timeframe, candles: Vec<Candle>) {
        let series = CandleSeries::from_unsorted(candles);
        self.data
            .insert((symbol.to_string(), tf), series.into_iter().collect());
    }

    pub fn with_series(mut self, symbol: &str, tf: Timeframe, series: &CandleSeries) -> Self {
        self.load(symbol, tf, series.as_slice().to_vec());
        self
    }

    /// Advance the simulation clock.
    pub fn set_time(&mut self, t: DateTime<Utc>) {
        self.now = Some(t);
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.data.keys().map(|(s, _)| s.clone()).collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    /// Candles up to the cursor (all of them when no cursor is set).
    fn visible_candles(&self, symbol: &str, tf: Timeframe) -> Option<CandleSeries> {
        let all = self.data.get(&(symbol.to_string(), tf))?;
        let end = match self.now {
            Some(now) => all.partition_point(|c| c.timestamp <= now),
            None => all.len(),
        };
        Some(CandleSeries::new(all[..end].to_vec()))
    }
}

#[async_trait]
impl CandleSource for HistoricalSource {
    async fn fetch_series(&self, symbol: &str, tf: Timeframe) -> Result<CandleSeries> {
        self.visible_candles(symbol, tf)
            .with_context(|| format!("no {} data loaded for {}", tf, symbol))
    }
}
