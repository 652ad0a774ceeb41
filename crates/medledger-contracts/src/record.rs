//! Audit entry and clinical payload types.
//!
//! `AuditEntry` is the atomic, immutable unit of the ledger — one action
//! against one patient's record, hash-linked to its predecessor.
//! `CandidateEntry` is the validated input the lifecycle manager hands to
//! the store; the store assigns everything chain-related.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The action an audit entry records against a patient's clinical state.
///
/// A logical `Modify` or `Delete` is itself a new appended entry, never an
/// edit of a prior one. `Delete` entries are tombstones: they mark the
/// patient's current state as absent without erasing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Modify,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Modify => "modify",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Role-relevant clinical fields carried by an entry.
///
/// Every field is optional at the type level; which fields are required for
/// which action is the lifecycle manager's concern (`create` demands a name
/// and age, a `delete` tombstone may carry nothing at all).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    /// Deserialized as a plain integer so negative submissions reach the
    /// validator instead of being rejected opaquely at the serde layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    /// Free-text clinical notes (the wire field `data`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Calendar date of the visit, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<String>,
}

impl ClinicalPayload {
    /// True when no clinical field is set (a bare tombstone payload).
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.diagnosis.is_none()
            && self.medication.is_none()
            && self.notes.is_none()
            && self.visit_date.is_none()
            && self.vitals.is_none()
    }

    /// Merge this (possibly partial) payload over `base`, field by field.
    ///
    /// Fields set on `self` win; unset fields fall back to `base`. Used by
    /// the lifecycle manager so a partial `modify` submission still appends
    /// an entry carrying the complete new state.
    pub fn merged_over(&self, base: &ClinicalPayload) -> ClinicalPayload {
        ClinicalPayload {
            patient_name: self.patient_name.clone().or_else(|| base.patient_name.clone()),
            age: self.age.or(base.age),
            gender: self.gender.clone().or_else(|| base.gender.clone()),
            diagnosis: self.diagnosis.clone().or_else(|| base.diagnosis.clone()),
            medication: self.medication.clone().or_else(|| base.medication.clone()),
            notes: self.notes.clone().or_else(|| base.notes.clone()),
            visit_date: self.visit_date.clone().or_else(|| base.visit_date.clone()),
            vitals: self.vitals.clone().or_else(|| base.vitals.clone()),
        }
    }
}

/// A validated submission, ready for the store to seal into the chain.
///
/// Produced exclusively by the lifecycle manager after existence and payload
/// checks pass. Everything chain-related — sequence, timestamp, hashes — is
/// assigned by the store at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// Identity of the user performing the action.
    pub actor_id: String,
    /// Subject of the action.
    pub patient_id: String,
    pub action: Action,
    pub payload: ClinicalPayload,
}

/// A single sealed entry in the hash-chained audit ledger.
///
/// Modifying any field — including those of the embedded `payload` —
/// invalidates `entry_hash` and every subsequent `prev_hash`, which
/// `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonically increasing position in the chain, starting at 0.
    pub sequence_id: u64,

    /// Wall-clock append time (UTC), monotone non-decreasing with
    /// `sequence_id`.
    pub timestamp: DateTime<Utc>,

    /// Identity of the user who performed the action.
    pub actor_id: String,

    /// Subject of the action. Opaque; a patient's own identifier and a
    /// doctor-entered identifier are the same key once associated.
    pub patient_id: String,

    pub action: Action,

    /// Flattened on the wire: clients consume entries as flat objects
    /// (`patient_name`, `age`, … beside `sequence_id`).
    #[serde(flatten)]
    pub payload: ClinicalPayload,

    /// SHA-256 hash (hex) of the previous entry, or `GENESIS_HASH` for the
    /// first entry.
    pub prev_hash: String,

    /// SHA-256 hash (hex) of this entry's canonical content, computed over
    /// (sequence_id, timestamp, actor_id, patient_id, action, payload,
    /// prev_hash).
    pub entry_hash: String,
}

impl AuditEntry {
    /// The sentinel `prev_hash` used for the first entry in the chain.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real data,
    /// making genesis detection unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";

    /// True when this entry is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        self.action == Action::Delete
    }
}
