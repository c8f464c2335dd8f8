use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("stop loss equals entry ({entry}); risk distance is zero")]
    ZeroRiskDistance { entry: f64 },

    #[error("{symbol} {timeframe}: {bars} bars available, {minimum} required")]
    InsufficientData {
        symbol: String,
        timeframe: String,
        bars: usize,
        minimum: usize,
    },

    #[error("{path}: invalid row: {reason}")]
    InvalidRow { path: String, reason: String },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
