//! Utilities shared by the store implementations

pub mod retry;
pub mod timing;

pub use retry::{RetryConfig, retry, retry_with_backoff};
pub use timing::{SLOW_QUERY_THRESHOLD, timed};
