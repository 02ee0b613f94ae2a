pub mod feed;
pub mod loader;
pub mod payload;

pub use feed::FileIncentiveFeed;
pub use loader::{ReferenceTableLoader, TableFile, TableLoadError};
pub use payload::{
    DecodedVehicle, PayloadError, VinDecodeResponse, VinDecodeResult,
    parse_federal_credit_records, parse_state_incentives_json,
};
