pub mod config;
pub mod estimator;
pub mod form;
pub mod logging;
pub mod utils;

pub use config::{AppConfig, ConfigError};
pub use estimator::Estimator;
pub use form::{FormEvent, LeaseForm};
