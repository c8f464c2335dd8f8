use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use consensus_signal_bot::config::Config;
use consensus_signal_bot::exchange::CsvCandleSource;
use consensus_signal_bot::trading::{LogNotifier, Scanner};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let source = CsvCandleSource::new(&cfg.data_dir);
    let symbols = if cfg.symbols.is_empty() {
        source.list_symbols()?
    } else {
        cfg.symbols.clone()
    };
    if symbols.is_empty() {
        warn!("No instruments configured and none cached in {}", cfg.data_dir);
        return Ok(());
    }

    info!("=== SIGNAL SCAN: {} instruments ===", symbols.len());
    let scanner = Scanner::new(cfg, Box::new(source), Box::new(LogNotifier));
    let alerts = scanner.scan(&symbols).await;
    info!("=== SCAN COMPLETE: {} signals ===", alerts.len());

    Ok(())
}
