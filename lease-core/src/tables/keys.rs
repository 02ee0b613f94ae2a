//! Canonical comparison keys.
//!
//! Makes and models compare case-insensitively; state codes and WMI codes are
//! uppercase. Every table insert and every lookup goes through these helpers
//! so the static and live paths agree.

pub(crate) fn name_key(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn code_key(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
