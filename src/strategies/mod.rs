pub mod aggregator;
pub mod bank;
pub mod fractal;
pub mod levels;
pub mod momentum;
pub mod range;
pub mod reversion;
pub mod signals;
pub mod trend;

pub use aggregator::aggregate;
pub use bank::{StrategyBank, StrategyKind};
pub use signals::{ConsolidatedSignal, StrategyInput, StrategySignal};
