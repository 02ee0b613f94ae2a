pub mod calculations;
pub mod credits;
pub mod models;
pub mod overlay;
pub mod tables;

pub use calculations::calculate_lease_payment;
pub use credits::CreditResolver;
pub use models::*;
pub use overlay::{FeedError, IncentiveFeed, LiveDataOverlay, OverlayStatus};
pub use tables::{ReferenceTables, ReferenceTablesBuilder, TableError, is_valid_vin, normalize_zip};
