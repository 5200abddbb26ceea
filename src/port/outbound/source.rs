//! Market source port.
//!
//! The refresh loop pulls a batch of raw market records from a
//! [`MarketSource`] once per cycle. Implementations own transport details;
//! the loop owns timeouts and the fallback dataset.

use async_trait::async_trait;

use crate::domain::market::RawMarketRecord;
use crate::error::FetchError;

/// Provider of raw market records.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch the current batch of market records.
    async fn fetch(&self) -> Result<Vec<RawMarketRecord>, FetchError>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}
