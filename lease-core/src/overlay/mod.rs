pub mod feed;
pub mod live;

pub use feed::{FeedError, IncentiveFeed};
pub use live::{DEFAULT_FEED_TIMEOUT, LiveDataOverlay, OverlayStatus};
