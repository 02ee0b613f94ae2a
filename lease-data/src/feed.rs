use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lease_core::{FeedError, IncentiveFeed, LiveFederalCredit, StateCreditEntry};
use tracing::debug;

use crate::payload::{PayloadError, parse_federal_credit_records, parse_state_incentives_json};

/// Incentive feed backed by JSON files on disk.
///
/// An unset path behaves like an unreachable endpoint: the fetch fails and
/// the overlay falls back to static data for that side.
#[derive(Debug, Clone, Default)]
pub struct FileIncentiveFeed {
    pub federal: Option<PathBuf>,
    pub state: Option<PathBuf>,
}

impl FileIncentiveFeed {
    pub fn new(
        federal: Option<PathBuf>,
        state: Option<PathBuf>,
    ) -> Self {
        Self { federal, state }
    }
}

#[async_trait]
impl IncentiveFeed for FileIncentiveFeed {
    async fn fetch_federal_credits(&self) -> Result<Vec<LiveFederalCredit>, FeedError> {
        let body = read(self.federal.as_deref(), "federal").await?;
        parse_federal_credit_records(&body).map_err(malformed)
    }

    async fn fetch_state_credits(&self) -> Result<Vec<StateCreditEntry>, FeedError> {
        let body = read(self.state.as_deref(), "state").await?;
        parse_state_incentives_json(&body).map_err(malformed)
    }
}

async fn read(
    path: Option<&Path>,
    which: &str,
) -> Result<String, FeedError> {
    let path = path.ok_or_else(|| FeedError::Unavailable(format!("no {which} feed configured")))?;
    debug!(path = %path.display(), "reading {which} incentive feed");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FeedError::Unavailable(format!("{}: {e}", path.display())))
}

fn malformed(err: PayloadError) -> FeedError {
    FeedError::Malformed(err.to_string())
}
