use serde::{Deserialize, Serialize};

/// World Manufacturer Identifier (first three VIN characters) → make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WmiEntry {
    pub wmi: String,
    pub make: String,
}

/// One- or two-character VIN prefix → country of manufacture. A two-character
/// prefix is more specific and wins over its first character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WmiCountry {
    pub prefix: String,
    pub country: String,
}

/// Result of a local, network-free VIN decode.
///
/// `make` is `None` when the WMI is not in the table and `model_year` is
/// `None` when position 10 holds a character that never encodes a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedVin {
    pub wmi: String,
    pub make: Option<String>,
    pub model_year: Option<i32>,
    pub region: Option<&'static str>,
    pub country: Option<String>,
}
