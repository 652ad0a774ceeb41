//! # medledger-contracts
//!
//! Shared types, filters, and the error taxonomy for the MedLedger audit
//! service.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, predicates, and error types.

pub mod caller;
pub mod error;
pub mod filter;
pub mod record;

pub use caller::{Caller, Role};
pub use error::{LedgerError, LedgerResult};
pub use filter::EntryFilter;
pub use record::{Action, AuditEntry, CandidateEntry, ClinicalPayload};

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn make_entry(seq: u64, actor: &str, patient: &str, name: Option<&str>) -> AuditEntry {
        AuditEntry {
            sequence_id: seq,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, seq as u32 % 60).unwrap(),
            actor_id: actor.to_string(),
            patient_id: patient.to_string(),
            action: Action::Create,
            payload: ClinicalPayload {
                patient_name: name.map(str::to_string),
                ..ClinicalPayload::default()
            },
            prev_hash: AuditEntry::GENESIS_HASH.to_string(),
            entry_hash: "deadbeef".to_string(),
        }
    }

    // ── Action / Role wire format ────────────────────────────────────────────

    #[test]
    fn action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Action::Create).unwrap(), "\"create\"");
        assert_eq!(serde_json::to_string(&Action::Modify).unwrap(), "\"modify\"");
        assert_eq!(serde_json::to_string(&Action::Delete).unwrap(), "\"delete\"");
    }

    #[test]
    fn action_round_trips() {
        for action in [Action::Create, Action::Modify, Action::Delete] {
            let json = serde_json::to_string(&action).unwrap();
            let decoded: Action = serde_json::from_str(&json).unwrap();
            assert_eq!(action, decoded);
        }
    }

    #[test]
    fn role_parses_wire_strings() {
        let role: Role = serde_json::from_str("\"auditor\"").unwrap();
        assert_eq!(role, Role::Auditor);
        assert_eq!(role.to_string(), "auditor");
    }

    // ── Caller binding ───────────────────────────────────────────────────────

    #[test]
    fn patient_binding_defaults_to_actor_id() {
        let caller = Caller::new("patient1", Role::Patient);
        assert_eq!(caller.patient_binding(), "patient1");
    }

    #[test]
    fn patient_binding_prefers_explicit_id() {
        let caller = Caller {
            actor_id: "user-77".to_string(),
            role: Role::Patient,
            patient_id: Some("P-0042".to_string()),
        };
        assert_eq!(caller.patient_binding(), "P-0042");
    }

    // ── ClinicalPayload merge ────────────────────────────────────────────────

    #[test]
    fn merged_over_prefers_new_fields_and_keeps_the_rest() {
        let base = ClinicalPayload {
            patient_name: Some("Ada".to_string()),
            age: Some(44),
            diagnosis: Some("hypertension".to_string()),
            ..ClinicalPayload::default()
        };
        let patch = ClinicalPayload {
            diagnosis: Some("hypertension stage 2".to_string()),
            medication: Some("lisinopril".to_string()),
            ..ClinicalPayload::default()
        };

        let merged = patch.merged_over(&base);
        assert_eq!(merged.patient_name.as_deref(), Some("Ada"));
        assert_eq!(merged.age, Some(44));
        assert_eq!(merged.diagnosis.as_deref(), Some("hypertension stage 2"));
        assert_eq!(merged.medication.as_deref(), Some("lisinopril"));
    }

    #[test]
    fn empty_payload_is_empty() {
        assert!(ClinicalPayload::default().is_empty());
        let named = ClinicalPayload {
            patient_name: Some("Ada".to_string()),
            ..ClinicalPayload::default()
        };
        assert!(!named.is_empty());
    }

    // ── EntryFilter ──────────────────────────────────────────────────────────

    #[test]
    fn default_filter_matches_everything() {
        let entry = make_entry(0, "dr-1", "P-1", Some("Ada"));
        assert!(EntryFilter::default().matches(&entry));
    }

    #[test]
    fn nothing_filter_matches_nothing() {
        let entry = make_entry(0, "dr-1", "P-1", Some("Ada"));
        let filter = EntryFilter::nothing();
        assert!(filter.is_nothing());
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn patient_and_actor_filters_are_exact() {
        let entry = make_entry(0, "dr-1", "P-1", None);
        assert!(EntryFilter::for_patient("P-1").matches(&entry));
        assert!(!EntryFilter::for_patient("P-2").matches(&entry));
        assert!(EntryFilter::for_actor("dr-1").matches(&entry));
        assert!(!EntryFilter::for_actor("dr-2").matches(&entry));
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let entry = make_entry(0, "dr-1", "P-1", Some("Ada Lovelace"));
        let filter = EntryFilter {
            patient_name: Some("lovelace".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&entry));

        let miss = EntryFilter {
            patient_name: Some("hopper".to_string()),
            ..EntryFilter::default()
        };
        assert!(!miss.matches(&entry));
    }

    #[test]
    fn time_range_bounds_are_inclusive() {
        let entry = make_entry(5, "dr-1", "P-1", None);
        let exact = EntryFilter {
            from: Some(entry.timestamp),
            to: Some(entry.timestamp),
            ..EntryFilter::default()
        };
        assert!(exact.matches(&entry));

        let after = EntryFilter {
            from: Some(entry.timestamp + chrono::Duration::seconds(1)),
            ..EntryFilter::default()
        };
        assert!(!after.matches(&entry));
    }

    // ── LedgerError display messages ─────────────────────────────────────────

    #[test]
    fn error_validation_lists_fields() {
        let err = LedgerError::Validation {
            fields: vec!["age".to_string(), "visit_date".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("age"));
        assert!(msg.contains("visit_date"));
    }

    #[test]
    fn error_conflict_displays() {
        let exists = LedgerError::AlreadyExists {
            patient_id: "P-1".to_string(),
        };
        assert!(exists.to_string().contains("already has an active record"));

        let missing = LedgerError::NotFound {
            patient_id: "P-9".to_string(),
        };
        assert!(missing.to_string().contains("no active record"));
        assert!(missing.to_string().contains("P-9"));
    }

    #[test]
    fn error_store_unavailable_displays() {
        let err = LedgerError::StoreUnavailable {
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn error_chain_integrity_displays_broken_sequences() {
        let err = LedgerError::ChainIntegrity { broken: vec![3, 4, 5] };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('5'));
    }
}
