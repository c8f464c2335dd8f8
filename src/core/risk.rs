use tracing::warn;

use crate::config::RiskConfig;
use crate::error::BotError;

/// `(capital * risk_fraction / |entry - stop_loss|) * leverage`.
pub fn position_size(
    entry: f64,
    stop_loss: f64,
    capital: f64,
    risk_fraction: f64,
    leverage: f64,
) -> Result<f64, BotError> {
    let distance = (entry - stop_loss).abs();
    if distance == 0.0 {
        return Err(BotError::ZeroRiskDistance { entry });
    }
    Ok(capital * risk_fraction / distance * leverage)
}

/// Stop distance as a percentage of entry. Zero when entry is zero.
pub fn percentage_risk(entry: f64, stop_loss: f64) -> f64 {
    if entry == 0.0 {
        return 0.0;
    }
    100.0 * (entry - stop_loss).abs() / entry
}

#[derive(Debug, Clone)]
pub struct RiskSizer {
    pub capital: f64,
    pub risk_fraction: f64,
    pub leverage: f64,
}

impl RiskSizer {
    pub fn new(cfg: &RiskConfig) -> Self {
        Self {
            capital: cfg.initial_capital,
            risk_fraction: cfg.risk_fraction,
            leverage: cfg.leverage,
        }
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.capital = capital;
        self
    }

    /// Position size for the given levels; degenerate levels size to zero.
    pub fn size(&self, entry: f64, stop_loss: f64) -> f64 {
        match position_size(entry, stop_loss, self.capital, self.risk_fraction, self.leverage) {
            Ok(size) => size,
            Err(e) => {
                warn!("position sizing skipped: {}", e);
                0.0
            }
        }
    }

    pub fn percentage_risk(&self, entry: f64, stop_loss: f64) -> f64 {
        percentage_risk(entry, stop_loss)
    }
}
