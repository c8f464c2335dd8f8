pub mod indicators;
pub mod risk;
pub mod swings;
pub mod trend;
