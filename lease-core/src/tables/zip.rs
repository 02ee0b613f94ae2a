//! ZIP code normalization and range search.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{MetroArea, ZipMatch, ZipMatchKind, ZipRange};

static ZIP_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,5})(?:-[0-9]{4})?$").expect("static regex"));

/// Normalizes user input to a five-digit, zero-padded ZIP string.
///
/// Accepts 1–5 digits (left-padded) and ZIP+4 (`12345-6789`, the suffix is
/// dropped). Anything else yields `None`.
///
/// ```
/// use lease_core::normalize_zip;
///
/// assert_eq!(normalize_zip("501").as_deref(), Some("00501"));
/// assert_eq!(normalize_zip("90210-1234").as_deref(), Some("90210"));
/// assert_eq!(normalize_zip("9021O"), None);
/// ```
pub fn normalize_zip(input: &str) -> Option<String> {
    let caps = ZIP_INPUT.captures(input.trim())?;
    Some(format!("{:0>5}", &caps[1]))
}

/// True when `value` is exactly five ASCII digits.
pub(crate) fn is_zip5(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Metro overrides first, then general ranges; first match wins in each.
pub(crate) fn find(
    zip: &str,
    metros: &[MetroArea],
    ranges: &[ZipRange],
) -> Option<ZipMatch> {
    let metro = metros
        .iter()
        .find(|m| m.start.as_str() <= zip && zip <= m.end.as_str())
        .map(|m| ZipMatch {
            state_code: m.state_code.clone(),
            kind: ZipMatchKind::Metropolitan(m.name.clone()),
        });
    if metro.is_some() {
        return metro;
    }

    ranges
        .iter()
        .find(|r| r.start.as_str() <= zip && zip <= r.end.as_str())
        .map(|r| ZipMatch {
            state_code: r.state_code.clone(),
            kind: ZipMatchKind::General(r.region.clone()),
        })
}
