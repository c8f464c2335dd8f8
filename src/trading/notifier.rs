use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::strategies::ConsolidatedSignal;

/// A sized consensus signal for one instrument, ready to be announced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAlert {
    pub symbol: String,
    pub signal: ConsolidatedSignal,
    pub position_size: f64,
    pub percentage_risk: f64,
}

impl SignalAlert {
    /// Webhook body: `{"content": <rendered message>}`.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "content": self.to_string() })
    }
}

impl fmt::Display for SignalAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.signal;
        writeln!(f, "Signal for {}", self.symbol)?;
        writeln!(f, "Action: {}", s.action)?;
        writeln!(f, "Entry: {:.5}", s.entry)?;
        writeln!(f, "TP: {:.5}", s.take_profit)?;
        writeln!(f, "SL: {:.5}", s.stop_loss)?;
        writeln!(f, "Trailing stop: {:.5}", s.trailing_stop)?;
        writeln!(f, "Position size: {:.5}", self.position_size)?;
        writeln!(f, "Risk: {:.2}% of capital", self.percentage_risk)?;
        writeln!(f, "Consensus score: {}", s.score)?;
        write!(f, "Strategies: {}", s.strategies.join(", "))
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &SignalAlert) -> Result<()>;
}

/// Writes alerts to the log instead of an external channel.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &SignalAlert) -> Result<()> {
        info!("[ALERT] {}", alert.to_string().replace('\n', " | "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    fn alert() -> SignalAlert {
        SignalAlert {
            symbol: "BTCUSDT".to_string(),
            signal: ConsolidatedSignal {
                action: Action::Buy,
                entry: 100.0,
                take_profit: 110.0,
                stop_loss: 95.0,
                trailing_stop: 4.0,
                score: 3,
                strategies: vec!["Momo".to_string(), "GoldenCross".to_string()],
            },
            position_size: 1.08,
            percentage_risk: 5.0,
        }
    }

    #[test]
    fn message_keeps_field_order() {
        let msg = alert().to_string();
        let order = [
            "Action: buy",
            "Entry: 100.00000",
            "TP: 110.00000",
            "SL: 95.00000",
            "Trailing stop: 4.00000",
            "Position size: 1.08000",
            "Risk: 5.00%",
            "Consensus score: 3",
            "Strategies: Momo, GoldenCross",
        ];
        let mut last = 0;
        for part in order {
            let pos = msg.find(part).unwrap_or_else(|| panic!("missing {part:?} in {msg}"));
            assert!(pos >= last, "{part:?} out of order");
            last = pos;
        }
    }

    #[test]
    fn payload_wraps_message() {
        let a = alert();
        let payload = a.to_payload();
        assert_eq!(payload["content"].as_str().unwrap(), a.to_string());
    }

    #[tokio::test]
    async fn log_notifier_accepts_alerts() {
        assert!(LogNotifier.notify(&alert()).await.is_ok());
    }
}
