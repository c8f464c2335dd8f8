use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CandleSeries, SwingType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub swing_type: SwingType,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Find local extremes in `candles`.
///
/// When `limit` is set only the most recent `limit` candles are scanned. A
/// candle at `i` (with `window <= i < len - window`) is a swing high when its
/// high is strictly greater than every other high within `window` bars on
/// either side; swing lows use the strict less-than rule on lows. Bars closer
/// than `window` to either edge never qualify.
pub fn detect_swings(
    candles: &CandleSeries,
    window: usize,
    limit: Option<usize>,
) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let view = match limit {
        Some(n) => candles.tail(n),
        None => candles.clone(),
    };
    let len = view.len();
    let mut highs = Vec::new();
    let mut lows = Vec::new();
    if window == 0 || len <= window * 2 {
        return (highs, lows);
    }

    for i in window..(len - window) {
        let current = &view[i];
        let neighbours = (i - window..=i + window).filter(|&j| j != i);

        let mut is_high = true;
        let mut is_low = true;
        for j in neighbours {
            if view[j].high >= current.high {
                is_high = false;
            }
            if view[j].low <= current.low {
                is_low = false;
            }
            if !is_high && !is_low {
                break;
            }
        }

        if is_high {
            highs.push(SwingPoint {
                swing_type: SwingType::High,
                price: current.high,
                timestamp: current.timestamp,
            });
        }
        if is_low {
            lows.push(SwingPoint {
                swing_type: SwingType::Low,
                price: current.low,
                timestamp: current.timestamp,
            });
        }
    }

    (highs, lows)
}

/// Extrapolates the next swing value from a chronological run of swings.
pub trait SwingProjector {
    /// `None` when there are not enough points to project from.
    fn project(&self, points: &[SwingPoint]) -> Option<f64>;
}

/// Least-squares line of price against occurrence index, evaluated one step past the last point.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearProjector;

impl SwingProjector for LinearProjector {
    fn project(&self, points: &[SwingPoint]) -> Option<f64> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = points.iter().map(|p| p.price).sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, p) in points.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (p.price - mean_y);
            sxx += dx * dx;
        }
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        Some(intercept + slope * n)
    }
}

pub fn project_next_swing(points: &[SwingPoint]) -> Option<f64> {
    LinearProjector.project(points)
}
