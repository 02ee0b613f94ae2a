//! Local VIN decoding: WMI → make, position 10 → model year.
//!
//! The model-year character repeats every 30 years, so `S` is both 1995 and
//! 2025. The decoder resolves the ambiguity by assuming the most recent cycle
//! that does not exceed a configured ceiling (normally next calendar year).
//! This is an approximation: a 1995 vehicle decodes as 2025.

use std::sync::LazyLock;

use regex::Regex;

static VIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("static regex"));

/// Year codes in cycle order; index 0 is 1980.
const YEAR_CODES: &str = "ABCDEFGHJKLMNPRSTVWXY123456789";
const FIRST_CYCLE_YEAR: i32 = 1980;
const CYCLE_YEARS: i32 = 30;

/// True for 17 characters drawn from the VIN alphabet (no `I`, `O`, `Q`),
/// compared case-insensitively.
///
/// ```
/// use lease_core::is_valid_vin;
///
/// assert!(is_valid_vin("5YJ3E1EA7KF317000"));
/// assert!(!is_valid_vin("5YJ3E1EA7KF31700"));   // 16 characters
/// assert!(!is_valid_vin("5YJ3E1EA7KF3170O0"));  // contains O
/// ```
pub fn is_valid_vin(vin: &str) -> bool {
    VIN_PATTERN.is_match(&vin.to_ascii_uppercase())
}

/// Most recent model year encoded by `code` that is not after `ceiling`.
///
/// `None` for characters that never encode a year (`0`, `U`, `Z`, `I`, `O`,
/// `Q`) and when even the first cycle lies after the ceiling.
pub fn model_year_for_code(
    code: char,
    ceiling: i32,
) -> Option<i32> {
    let index = YEAR_CODES.find(code.to_ascii_uppercase())?;
    let base = FIRST_CYCLE_YEAR + i32::try_from(index).ok()?;
    if base > ceiling {
        return None;
    }
    Some(base + CYCLE_YEARS * ((ceiling - base) / CYCLE_YEARS))
}

/// Geographic region assigned to the first WMI character.
pub fn region_for(first: char) -> Option<&'static str> {
    match first.to_ascii_uppercase() {
        'A'..='C' => Some("Africa"),
        'D'..='G' => Some("Europe"),
        'H' | 'J' | 'K' | 'L' | 'M' | 'N' | 'P' | 'R' => Some("Asia"),
        'S'..='Z' => Some("Europe"),
        '1'..='5' => Some("North America"),
        '6' => Some("Oceania"),
        '7' => Some("Oceania/North America"),
        '8' | '9' => Some("South America"),
        _ => None,
    }
}
