use crate::config::TrendConfig;
use crate::models::{CandleSeries, Trend};

/// Compare the latest close against the mean of the last `lookback` closes.
pub fn classify(candles: &CandleSeries, lookback: usize, band: f64) -> Trend {
    if candles.is_empty() || lookback == 0 {
        return Trend::Neutral;
    }
    let recent = candles.tail(lookback).closes();
    let avg = recent.iter().sum::<f64>() / recent.len() as f64;
    let last = recent[recent.len() - 1];

    if last > avg * (1.0 + band) {
        Trend::Upward
    } else if last < avg * (1.0 - band) {
        Trend::Downward
    } else {
        Trend::Neutral
    }
}

pub fn determine_trend(candles: &CandleSeries, cfg: &TrendConfig) -> Trend {
    classify(candles, cfg.lookback, cfg.band)
}

pub fn determine_short_term_trend(candles: &CandleSeries, cfg: &TrendConfig) -> Trend {
    classify(candles, cfg.short_lookback, cfg.short_band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_bearish_trend, make_bullish_trend, make_closes};

    #[test]
    fn empty_series_is_neutral() {
        let cfg = TrendConfig::default();
        assert_eq!(determine_trend(&CandleSeries::default(), &cfg), Trend::Neutral);
        assert_eq!(
            determine_short_term_trend(&CandleSeries::default(), &cfg),
            Trend::Neutral
        );
    }

    #[test]
    fn rising_and_falling_series() {
        let cfg = TrendConfig::default();
        assert_eq!(determine_trend(&make_bullish_trend(30, 100.0), &cfg), Trend::Upward);
        assert_eq!(determine_trend(&make_bearish_trend(30, 1000.0), &cfg), Trend::Downward);
    }

    #[test]
    fn bands_are_exclusive() {
        let cfg = TrendConfig::default();
        // nine closes of 100 and a last close of 100.4: avg 100.04, limit 100.5402
        let mut closes = vec![100.0; 9];
        closes.push(100.4);
        assert_eq!(determine_trend(&make_closes(&closes), &cfg), Trend::Neutral);

        // short window uses +-0.2%: avg of [100,100,100,100,100.4] = 100.08, limit 100.28
        assert_eq!(
            determine_short_term_trend(&make_closes(&closes), &cfg),
            Trend::Upward
        );
    }

    #[test]
    fn only_recent_closes_count() {
        let cfg = TrendConfig::default();
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 5.0).collect();
        closes.extend(vec![50.0; 10]);
        assert_eq!(determine_trend(&make_closes(&closes), &cfg), Trend::Neutral);
    }
}
