use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
}

impl Timeframe {
    /// Primary series every evaluator computes its indicators on.
    pub const PRIMARY: Timeframe = Timeframe::M15;
    /// Higher timeframe used for trend gating.
    pub const CONTEXT: Timeframe = Timeframe::H1;
    /// Highest-resolution series, preferred for swing detection.
    pub const FINE: Timeframe = Timeframe::M1;
    /// Short-term confirmation series.
    pub const EXTRA: Timeframe = Timeframe::M5;

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
