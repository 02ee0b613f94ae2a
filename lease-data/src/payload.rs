//! Decoders for the external feed payloads.
//!
//! These are the shapes the upstream services deliver. Conversion to core
//! records happens here so the overlay only ever sees typed data.

use std::str::FromStr;

use lease_core::{LiveFederalCredit, StateCreditEntry};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected payload shape: {0}")]
    Shape(String),
}

// ── state incentives ─────────────────────────────────────────────────────

/// Decodes the state incentive feed: an object keyed by state code.
///
/// Each entry may give the new-vehicle amount as `rebate`, `new` or
/// `taxCredit`; the used-vehicle amount as `usedRebate`, `used` or the first
/// `additionalPrograms.<name>.usedEV`; and the program name as `program` or the
/// first `additionalPrograms` key. Missing amounts are zero. Non-object
/// entries are skipped.
pub fn parse_state_incentives_json(json: &str) -> Result<Vec<StateCreditEntry>, PayloadError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(states) = root else {
        return Err(PayloadError::Shape(
            "state incentives must be a JSON object keyed by state code".to_string(),
        ));
    };

    let mut entries = Vec::with_capacity(states.len());
    for (code, body) in &states {
        let Value::Object(fields) = body else {
            debug!(state = %code, "skipping non-object state incentive entry");
            continue;
        };

        let programs = fields.get("additionalPrograms").and_then(Value::as_object);

        let new_vehicle_rebate = ["rebate", "new", "taxCredit"]
            .iter()
            .find_map(|k| fields.get(*k).and_then(amount))
            .unwrap_or(Decimal::ZERO);

        let used_vehicle_rebate = ["usedRebate", "used"]
            .iter()
            .find_map(|k| fields.get(*k).and_then(amount))
            .or_else(|| {
                programs.and_then(|p| p.values().find_map(|prog| prog.get("usedEV").and_then(amount)))
            })
            .unwrap_or(Decimal::ZERO);

        let program_name = fields
            .get("program")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| programs.and_then(|p| p.keys().next().cloned()))
            .unwrap_or_default();

        entries.push(StateCreditEntry {
            state_code: code.clone(),
            new_vehicle_rebate,
            used_vehicle_rebate,
            program_name,
        });
    }

    Ok(entries)
}

/// A JSON number or a numeric string such as `"$2,500"`.
fn amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => parse_amount_text(s),
        _ => None,
    }
}

fn parse_amount_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    Decimal::from_str(&cleaned).ok()
}

// ── federal credits ──────────────────────────────────────────────────────

/// Text-field record as converted from the federal feed's XML.
#[derive(Debug, Deserialize)]
struct FederalCreditText {
    #[serde(default)]
    make: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    credit: String,
}

/// Decodes a JSON array of `{make, model, year, credit}` text records.
///
/// Unparsable numbers become zero; the overlay drops such records at
/// ingestion.
pub fn parse_federal_credit_records(json: &str) -> Result<Vec<LiveFederalCredit>, PayloadError> {
    let records: Vec<FederalCreditText> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .map(|r| LiveFederalCredit {
            year: r.year.trim().parse().unwrap_or(0),
            amount: parse_amount_text(&r.credit).unwrap_or(Decimal::ZERO),
            make: r.make,
            model: r.model,
        })
        .collect())
}

// ── VIN decode ───────────────────────────────────────────────────────────

/// Response body of the VIN decode service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VinDecodeResponse {
    #[serde(rename = "Results", default)]
    pub results: Vec<VinDecodeResult>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VinDecodeResult {
    #[serde(rename = "Variable")]
    pub variable: String,
    #[serde(rename = "Value")]
    pub value: Option<String>,
}

/// The vehicle fields the estimator needs from a remote decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedVehicle {
    pub make: String,
    pub model: Option<String>,
    pub year: Option<i32>,
}

impl VinDecodeResponse {
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// First usable value among `variables`, in order. Empty strings and
    /// `"Not Applicable"` count as absent.
    pub fn value(
        &self,
        variables: &[&str],
    ) -> Option<&str> {
        variables.iter().find_map(|wanted| {
            self.results
                .iter()
                .filter(|r| r.variable.eq_ignore_ascii_case(wanted))
                .filter_map(|r| r.value.as_deref().map(str::trim))
                .find(|v| !v.is_empty() && !v.eq_ignore_ascii_case("Not Applicable"))
        })
    }

    /// Make, model and year, or `None` when the response has no make.
    pub fn vehicle(&self) -> Option<DecodedVehicle> {
        let make = self.value(&["Make", "Manufacturer Name"])?.to_string();
        let model = self.value(&["Model"]).map(str::to_string);
        let year = self
            .value(&["Model Year", "ModelYear"])
            .and_then(|y| y.parse().ok());
        Some(DecodedVehicle { make, model, year })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn by_code<'a>(
        entries: &'a [StateCreditEntry],
        code: &str,
    ) -> &'a StateCreditEntry {
        entries.iter().find(|e| e.state_code == code).unwrap()
    }

    // ── state incentives ─────────────────────────────────────────────────
    #[test]
    fn state_incentives_accept_every_field_alias() {
        let json = r#"{
            "CO": {
                "rebate": 2500,
                "additionalPrograms": {
                    "Colorado EV Tax Credit": { "newEV": 5000, "usedEV": 3500 }
                }
            },
            "NJ": { "new": "5,000", "used": 2500, "program": "Charge Up New Jersey" },
            "GA": { "taxCredit": 2500, "requirements": ["Georgia resident"] },
            "WA": { "usedRebate": 1000 }
        }"#;

        let entries = parse_state_incentives_json(json).unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(
            *by_code(&entries, "CO"),
            StateCreditEntry {
                state_code: "CO".to_string(),
                new_vehicle_rebate: dec!(2500),
                used_vehicle_rebate: dec!(3500),
                program_name: "Colorado EV Tax Credit".to_string(),
            }
        );
        assert_eq!(by_code(&entries, "NJ").new_vehicle_rebate, dec!(5000));
        assert_eq!(by_code(&entries, "NJ").program_name, "Charge Up New Jersey");
        assert_eq!(by_code(&entries, "GA").new_vehicle_rebate, dec!(2500));
        assert_eq!(by_code(&entries, "WA").new_vehicle_rebate, Decimal::ZERO);
        assert_eq!(by_code(&entries, "WA").used_vehicle_rebate, dec!(1000));
    }

    #[test]
    fn state_incentives_skip_non_object_entries() {
        let entries = parse_state_incentives_json(r#"{"CA": 2000, "NY": {"rebate": 2000}}"#).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state_code, "NY");
    }

    #[test]
    fn state_incentives_reject_top_level_array() {
        let err = parse_state_incentives_json("[]").unwrap_err();

        assert!(matches!(err, PayloadError::Shape(_)));
    }

    // ── federal credits ──────────────────────────────────────────────────
    #[test]
    fn federal_records_convert_text_fields() {
        let json = r#"[
            {"make": "Tesla", "model": "Model Y", "year": "2025", "credit": "$7,500"},
            {"make": "Ford", "model": "F-150 Lightning", "year": "n/a", "credit": "7500"}
        ]"#;

        let records = parse_federal_credit_records(json).unwrap();

        assert_eq!(
            records[0],
            LiveFederalCredit {
                make: "Tesla".to_string(),
                model: "Model Y".to_string(),
                year: 2025,
                amount: dec!(7500),
            }
        );
        assert_eq!(records[1].year, 0);
    }

    #[test]
    fn federal_records_reject_malformed_json() {
        assert!(matches!(
            parse_federal_credit_records("{not json"),
            Err(PayloadError::Json(_))
        ));
    }

    // ── VIN decode ───────────────────────────────────────────────────────
    #[test]
    fn vin_response_yields_vehicle() {
        let json = r#"{"Count": 4, "Results": [
            {"Variable": "Make", "Value": "BMW", "ValueId": "452"},
            {"Variable": "Model", "Value": "i4", "ValueId": ""},
            {"Variable": "Model Year", "Value": "2025", "ValueId": ""},
            {"Variable": "Trim", "Value": null, "ValueId": ""}
        ]}"#;

        let vehicle = VinDecodeResponse::from_json(json).unwrap().vehicle();

        assert_eq!(
            vehicle,
            Some(DecodedVehicle {
                make: "BMW".to_string(),
                model: Some("i4".to_string()),
                year: Some(2025),
            })
        );
    }

    #[test]
    fn vin_response_skips_not_applicable_values() {
        let json = r#"{"Results": [
            {"Variable": "Make", "Value": "Not Applicable"},
            {"Variable": "Manufacturer Name", "Value": "HYUNDAI MOTOR CO"}
        ]}"#;
        let response = VinDecodeResponse::from_json(json).unwrap();

        assert_eq!(response.value(&["Make", "Manufacturer Name"]), Some("HYUNDAI MOTOR CO"));
        assert_eq!(response.value(&["Trim"]), None);
    }

    #[test]
    fn vin_response_without_make_has_no_vehicle() {
        let response = VinDecodeResponse::from_json(r#"{"Results": []}"#).unwrap();

        assert_eq!(response.vehicle(), None);
    }
}
