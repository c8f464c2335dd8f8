//! Series indicators over plain `f64` slices.
//!
//! Every function returns one entry per input bar; entries are `None` until
//! the indicator has enough history (the warm-up).

use crate::models::{Candle, CandleSeries};

/// Last value of an indicator series, if it is past warm-up.
pub fn last(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

pub fn sma(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if n == 0 || values.len() < n {
        return out;
    }
    let mut sum: f64 = values[..n].iter().sum();
    out[n - 1] = Some(sum / n as f64);
    for i in n..values.len() {
        sum += values[i] - values[i - n];
        out[i] = Some(sum / n as f64);
    }
    out
}

/// Exponential moving average seeded with the SMA of the first `n` values.
pub fn ema(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if n == 0 || values.len() < n {
        return out;
    }
    let k = 2.0 / (n as f64 + 1.0);
    let mut prev = values[..n].iter().sum::<f64>() / n as f64;
    out[n - 1] = Some(prev);
    for i in n..values.len() {
        prev = values[i] * k + prev * (1.0 - k);
        out[i] = Some(prev);
    }
    out
}

/// EMA over a series that only becomes defined part-way through.
fn ema_of_defined(values: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    let start = match values.iter().position(|v| v.is_some()) {
        Some(s) => s,
        None => return vec![None; values.len()],
    };
    let defined: Vec<f64> = values[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
    let mut out = vec![None; start];
    out.extend(ema(&defined, n));
    out
}

/// Rolling sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if n < 2 || values.len() < n {
        return out;
    }
    for i in (n - 1)..values.len() {
        let window = &values[i + 1 - n..=i];
        let mean = window.iter().sum::<f64>() / n as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        out[i] = Some(var.sqrt());
    }
    out
}

/// Relative strength index with Wilder smoothing. First value at index `n`.
pub fn rsi(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if n == 0 || values.len() <= n {
        return out;
    }

    let rsi_from = |gain: f64, loss: f64| {
        if loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        }
    };

    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
    for i in 1..=n {
        let change = values[i] - values[i - 1];
        avg_gain += change.max(0.0);
        avg_loss += (-change).max(0.0);
    }
    avg_gain /= n as f64;
    avg_loss /= n as f64;
    out[n] = Some(rsi_from(avg_gain, avg_loss));

    for i in (n + 1)..values.len() {
        let change = values[i] - values[i - 1];
        avg_gain = (avg_gain * (n - 1) as f64 + change.max(0.0)) / n as f64;
        avg_loss = (avg_loss * (n - 1) as f64 + (-change).max(0.0)) / n as f64;
        out[i] = Some(rsi_from(avg_gain, avg_loss));
    }
    out
}

/// Fast-K stochastic of RSI on a 0..1 scale. A flat RSI window reads 0.
pub fn stoch_rsi(values: &[f64], rsi_n: usize, k_n: usize) -> Vec<Option<f64>> {
    let r = rsi(values, rsi_n);
    let mut out = vec![None; values.len()];
    if k_n == 0 {
        return out;
    }
    for i in 0..r.len() {
        if i + 1 < k_n {
            continue;
        }
        let window: Option<Vec<f64>> = r[i + 1 - k_n..=i].iter().copied().collect();
        let Some(window) = window else { continue };
        let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let cur = window[window.len() - 1];
        out[i] = Some(if hi > lo { (cur - lo) / (hi - lo) } else { 0.0 });
    }
    out
}

#[derive(Debug, Clone)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal_n: usize) -> Macd {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of_defined(&line, signal_n);
    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();
    Macd {
        line,
        signal,
        histogram,
    }
}

fn true_ranges(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..high.len())
        .map(|i| {
            if i == 0 {
                high[0] - low[0]
            } else {
                let hl = high[i] - low[i];
                hl.max((high[i] - close[i - 1]).abs())
                    .max((low[i] - close[i - 1]).abs())
            }
        })
        .collect()
}

/// Average true range with Wilder smoothing; first value at index `n` (mean of TR[1..=n]).
pub fn atr(high: &[f64], low: &[f64], close: &[f64], n: usize) -> Vec<Option<f64>> {
    let len = high.len().min(low.len()).min(close.len());
    let mut out = vec![None; len];
    if n == 0 || len <= n {
        return out;
    }
    let tr = true_ranges(&high[..len], &low[..len], &close[..len]);
    let mut prev = tr[1..=n].iter().sum::<f64>() / n as f64;
    out[n] = Some(prev);
    for i in (n + 1)..len {
        prev = (prev * (n - 1) as f64 + tr[i]) / n as f64;
        out[i] = Some(prev);
    }
    out
}

/// Average directional index (Wilder). First value at index `2n - 1`.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], n: usize) -> Vec<Option<f64>> {
    let len = high.len().min(low.len()).min(close.len());
    let mut out = vec![None; len];
    if n == 0 || len < 2 * n {
        return out;
    }
    let tr = true_ranges(&high[..len], &low[..len], &close[..len]);
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    for i in 1..len {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let mut s_tr: f64 = tr[1..=n].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=n].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=n].iter().sum();

    let dx = |tr: f64, plus: f64, minus: f64| {
        if tr == 0.0 {
            return 0.0;
        }
        let pdi = 100.0 * plus / tr;
        let mdi = 100.0 * minus / tr;
        if pdi + mdi == 0.0 {
            0.0
        } else {
            100.0 * (pdi - mdi).abs() / (pdi + mdi)
        }
    };

    let mut dxs = vec![dx(s_tr, s_plus, s_minus)];
    let mut adx_val = 0.0;
    for i in (n + 1)..len {
        s_tr = s_tr - s_tr / n as f64 + tr[i];
        s_plus = s_plus - s_plus / n as f64 + plus_dm[i];
        s_minus = s_minus - s_minus / n as f64 + minus_dm[i];
        let d = dx(s_tr, s_plus, s_minus);

        if dxs.len() < n {
            dxs.push(d);
            if dxs.len() == n {
                adx_val = dxs.iter().sum::<f64>() / n as f64;
                out[i] = Some(adx_val);
            }
        } else {
            adx_val = (adx_val * (n - 1) as f64 + d) / n as f64;
            out[i] = Some(adx_val);
        }
    }
    out
}

/// Heikin-Ashi candles.
///
/// close = (O + H + L + C) / 4, open = previous bar's raw open (the first bar
/// keeps its own), high/low widened to include the HA open and close.
pub fn heikin_ashi(candles: &CandleSeries) -> CandleSeries {
    let mut out = CandleSeries::default();
    let mut prev_open: Option<f64> = None;
    for c in candles.iter() {
        let ha_close = (c.open + c.high + c.low + c.close) / 4.0;
        let ha_open = prev_open.unwrap_or(c.open);
        out.push(Candle {
            timestamp: c.timestamp,
            open: ha_open,
            high: c.high.max(ha_open).max(ha_close),
            low: c.low.min(ha_open).min(ha_close),
            close: ha_close,
            volume: c.volume,
        });
        prev_open = Some(c.open);
    }
    out
}
