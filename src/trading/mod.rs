pub mod notifier;
pub mod record_store;
pub mod scanner;
pub mod trade_record;

pub use notifier::{LogNotifier, Notifier, SignalAlert};
pub use record_store::CsvTable;
pub use scanner::Scanner;
pub use trade_record::{Operation, SignalLogRecord};
