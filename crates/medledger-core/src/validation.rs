//! Payload shape validation, per action.
//!
//! Failures are collected across all fields before returning so the caller
//! sees the full problem set in one pass rather than one field at a time.

use chrono::NaiveDate;

use medledger_contracts::{Action, ClinicalPayload, LedgerError, LedgerResult};

/// The calendar format accepted for `visit_date`.
const VISIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate `payload` for `action`.
///
/// Rules:
/// - `create` requires a non-blank `patient_name` and an `age`.
/// - `age`, when present, must be a non-negative integer.
/// - `visit_date`, when present, must parse as a `YYYY-MM-DD` calendar date.
/// - `delete` tombstones need carry nothing beyond identification, so no
///   field is required.
///
/// Returns `LedgerError::Validation` listing every offending field.
pub fn validate_payload(action: Action, payload: &ClinicalPayload) -> LedgerResult<()> {
    let mut fields: Vec<String> = Vec::new();

    if action == Action::Create {
        let name_blank = payload
            .patient_name
            .as_deref()
            .map_or(true, |n| n.trim().is_empty());
        if name_blank {
            fields.push("patient_name".to_string());
        }
        if payload.age.is_none() {
            fields.push("age".to_string());
        }
    }

    if let Some(age) = payload.age {
        if age < 0 {
            fields.push("age".to_string());
        }
    }

    if let Some(date) = &payload.visit_date {
        if NaiveDate::parse_from_str(date, VISIT_DATE_FORMAT).is_err() {
            fields.push("visit_date".to_string());
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation { fields })
    }
}
