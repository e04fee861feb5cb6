pub mod activity;
pub mod classifier;
pub mod filters;
pub mod signal;
pub mod statistics;
pub mod transactions;

pub use activity::holder_activity;
pub use classifier::{classify_address, AddressClassifier, ClassifierConfig, TransferIndex};
pub use filters::{dedupe_transfers, filter_market_holders, filter_market_transfers, within_window};
pub use signal::{determine_signal, SignalConfig};
pub use statistics::{aggregate, AnalysisError};
pub use transactions::{classify_transfers, holder_ranks};
