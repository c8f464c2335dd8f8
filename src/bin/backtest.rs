use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::{fmt, EnvFilter};

use consensus_signal_bot::backtesting::{BacktestData, BacktestReport, Simulator};
use consensus_signal_bot::config::Config;
use consensus_signal_bot::exchange::CsvCandleSource;
use consensus_signal_bot::models::Timeframe;
use consensus_signal_bot::strategies::StrategyKind;
use consensus_signal_bot::trading::{CsvTable, Operation};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // backtest <SYMBOL> [STRATEGY_ID]
    let args: Vec<String> = std::env::args().collect();
    let Some(symbol) = args.get(1).cloned() else {
        bail!("usage: backtest <SYMBOL> [STRATEGY_ID]");
    };
    let kinds = match args.get(2) {
        Some(id) => match StrategyKind::from_id(id) {
            Some(kind) => vec![kind],
            None => bail!("unknown strategy '{}'", id),
        },
        None => cfg.strategy.enabled.clone(),
    };

    let source = CsvCandleSource::new(&cfg.data_dir);
    let mut data = BacktestData::new(
        source.load_series(&symbol, Timeframe::PRIMARY)?,
        source.load_series(&symbol, Timeframe::CONTEXT)?,
    );
    data.fine = source.load_series(&symbol, Timeframe::FINE).ok();
    data.extra = source.load_series(&symbol, Timeframe::EXTRA).ok();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║          CONSENSUS SIGNAL BOT — BACKTESTER               ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("  Symbol:      {}", symbol);
    println!("  Strategies:  {}", kinds.len());
    println!("  {} bars:    {}", Timeframe::PRIMARY, data.primary.len());
    println!("  {} bars:     {}", Timeframe::CONTEXT, data.context.len());
    if data.primary.len() <= cfg.backtest.warmup {
        warn!(
            "{} has {} primary bars, warm-up is {}; nothing to simulate",
            symbol,
            data.primary.len(),
            cfg.backtest.warmup
        );
        return Ok(());
    }

    let record = Arc::new(CsvTable::<Operation>::new(&cfg.operations_file));
    let data = Arc::new(data);

    let handles: Vec<_> = kinds
        .into_iter()
        .map(|kind| {
            let sim = Simulator::new(&symbol, cfg.clone()).with_record(Arc::clone(&record));
            let data = Arc::clone(&data);
            tokio::task::spawn_blocking(move || sim.run_strategy(&data, kind).report)
        })
        .collect();

    let mut reports: Vec<BacktestReport> = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(e) => error!("simulation task failed: {}", e),
        }
    }

    for report in &reports {
        report.print_summary();
    }
    println!("\nOperations appended to: {}", record.path().display());

    Ok(())
}
