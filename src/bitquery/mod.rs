pub mod client;
pub mod queries;
pub mod types;

pub use client::{BitqueryClient, BitqueryError, RetryPolicy, TokenDataSource};
pub use queries::is_valid_address;
pub use types::{ApiTokenHolder, ApiTransfer};
