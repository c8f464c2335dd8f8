pub mod csv_source;
pub mod historical;

pub use csv_source::CsvCandleSource;
pub use historical::HistoricalSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CandleSeries, Timeframe};

/// Supplies ordered, de-duplicated candle series per instrument and timeframe.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_series(&self, symbol: &str, tf: Timeframe) -> Result<CandleSeries>;
}
