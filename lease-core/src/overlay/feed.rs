use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LiveFederalCredit, StateCreditEntry};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed feed payload: {0}")]
    Malformed(String),

    #[error("Feed timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of live incentive records. Implementations own all I/O and payload
/// decoding; the overlay only sees converted records.
#[async_trait]
pub trait IncentiveFeed: Send + Sync {
    async fn fetch_federal_credits(&self) -> Result<Vec<LiveFederalCredit>, FeedError>;

    async fn fetch_state_credits(&self) -> Result<Vec<StateCreditEntry>, FeedError>;
}
