//! Process-wide live incentive data, held by whoever needs it.
//!
//! The overlay owns two containers, one per feed. Each is an `Arc` snapshot
//! replaced wholesale under a short write lock, so a reader sees either the
//! previous contents or the new ones and never blocks on a fetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::feed::{FeedError, IncentiveFeed};
use crate::models::{LiveFederalCredit, StateCreditEntry};
use crate::tables::{code_key, name_key};

/// Upper bound on each feed fetch when no timeout is configured.
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Advisory readiness. Lookups are valid in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStatus {
    Empty,
    Populating,
    Ready,
}

pub struct LiveDataOverlay {
    feed: Option<Arc<dyn IncentiveFeed>>,
    timeout: Duration,
    federal: RwLock<Arc<Vec<LiveFederalCredit>>>,
    states: RwLock<Arc<HashMap<String, StateCreditEntry>>>,
    status: RwLock<OverlayStatus>,
}

impl LiveDataOverlay {
    pub fn new(
        feed: Arc<dyn IncentiveFeed>,
        timeout: Duration,
    ) -> Self {
        Self::with_feed(Some(feed), timeout)
    }

    /// An overlay with no feed. `populate` is a no-op and every lookup falls
    /// through to static data.
    pub fn disabled() -> Self {
        Self::with_feed(None, DEFAULT_FEED_TIMEOUT)
    }

    fn with_feed(
        feed: Option<Arc<dyn IncentiveFeed>>,
        timeout: Duration,
    ) -> Self {
        Self {
            feed,
            timeout,
            federal: RwLock::new(Arc::new(Vec::new())),
            states: RwLock::new(Arc::new(HashMap::new())),
            status: RwLock::new(OverlayStatus::Empty),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.feed.is_some()
    }

    pub fn status(&self) -> OverlayStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches both feeds concurrently and installs whatever arrives.
    ///
    /// Each fetch is bounded by the configured timeout. A failed or timed-out
    /// fetch is logged and leaves its container empty; it never affects the
    /// other feed and never surfaces to the caller.
    pub async fn populate(&self) {
        let Some(feed) = self.feed.as_ref() else {
            debug!("live incentive overlay disabled; skipping populate");
            return;
        };

        self.set_status(OverlayStatus::Populating);

        let (federal, states) = tokio::join!(
            bounded(self.timeout, feed.fetch_federal_credits()),
            bounded(self.timeout, feed.fetch_state_credits()),
        );

        let federal = match federal {
            Ok(records) => ingest_federal(records),
            Err(e) => {
                warn!(error = %e, "federal credit feed failed; static credits apply");
                Vec::new()
            }
        };
        let states = match states {
            Ok(records) => ingest_states(records),
            Err(e) => {
                warn!(error = %e, "state incentive feed failed; static credits apply");
                HashMap::new()
            }
        };

        info!(
            federal = federal.len(),
            states = states.len(),
            "live incentive overlay populated"
        );

        self.install(federal, states);
        self.set_status(OverlayStatus::Ready);
    }

    /// Drops all live data; lookups fall back to static tables.
    pub fn clear(&self) {
        self.install(Vec::new(), HashMap::new());
        self.set_status(OverlayStatus::Empty);
    }

    pub async fn refresh(&self) {
        self.clear();
        self.populate().await;
    }

    /// Current federal snapshot.
    pub fn federal_credits(&self) -> Arc<Vec<LiveFederalCredit>> {
        Arc::clone(&self.federal.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Live federal credit for an exact make, model and year. Make and model
    /// compare case-insensitively.
    pub fn federal_credit(
        &self,
        make: &str,
        model: &str,
        year: i32,
    ) -> Option<Decimal> {
        let make = name_key(make);
        let model = name_key(model);
        self.federal_credits()
            .iter()
            .find(|c| c.year == year && name_key(&c.make) == make && name_key(&c.model) == model)
            .map(|c| c.amount)
    }

    pub fn state_credit(
        &self,
        state_code: &str,
    ) -> Option<StateCreditEntry> {
        let snapshot = Arc::clone(&self.states.read().unwrap_or_else(PoisonError::into_inner));
        snapshot.get(&code_key(state_code)).cloned()
    }

    fn install(
        &self,
        federal: Vec<LiveFederalCredit>,
        states: HashMap<String, StateCreditEntry>,
    ) {
        *self.federal.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(federal);
        *self.states.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(states);
    }

    fn set_status(
        &self,
        status: OverlayStatus,
    ) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

impl std::fmt::Debug for LiveDataOverlay {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LiveDataOverlay")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .field("status", &self.status())
            .finish()
    }
}

async fn bounded<T>(
    limit: Duration,
    fetch: impl Future<Output = Result<T, FeedError>>,
) -> Result<T, FeedError> {
    tokio::time::timeout(limit, fetch)
        .await
        .map_err(|_| FeedError::Timeout(limit))?
}

fn ingest_federal(records: Vec<LiveFederalCredit>) -> Vec<LiveFederalCredit> {
    let total = records.len();
    let kept: Vec<LiveFederalCredit> = records
        .into_iter()
        .filter_map(|mut c| {
            c.make = c.make.trim().to_string();
            c.model = c.model.trim().to_string();
            let usable = !c.make.is_empty()
                && !c.model.is_empty()
                && c.year > 0
                && c.amount > Decimal::ZERO;
            usable.then_some(c)
        })
        .collect();
    if kept.len() < total {
        debug!(dropped = total - kept.len(), "dropped unusable federal credit records");
    }
    kept
}

fn ingest_states(records: Vec<StateCreditEntry>) -> HashMap<String, StateCreditEntry> {
    let mut map = HashMap::with_capacity(records.len());
    for mut entry in records {
        entry.state_code = code_key(&entry.state_code);
        if entry.state_code.is_empty()
            || entry.new_vehicle_rebate < Decimal::ZERO
            || entry.used_vehicle_rebate < Decimal::ZERO
        {
            debug!(state = %entry.state_code, "dropped unusable state incentive record");
            continue;
        }
        map.insert(entry.state_code.clone(), entry);
    }
    map
}
