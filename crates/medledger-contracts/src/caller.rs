//! Per-request caller context.
//!
//! Identity and credential verification are an external collaborator's job.
//! The core consumes an already-authenticated `(actor_id, role)` pair on
//! every operation — explicit per-request context, never ambient state.

use serde::{Deserialize, Serialize};

/// The role a caller acts under, fixed at authentication time.
///
/// Each role maps to a visibility predicate in the access control filter:
/// doctors see entries they authored, auditors see everything, patients see
/// entries about themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Auditor,
    Patient,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Doctor => "doctor",
            Role::Auditor => "auditor",
            Role::Patient => "patient",
        };
        f.write_str(s)
    }
}

/// An authenticated caller, passed into every core operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    /// The authenticated user identity (matches `AuditEntry::actor_id` for
    /// entries this caller authored).
    pub actor_id: String,

    pub role: Role,

    /// For `Role::Patient`, the patient identity this caller is bound to
    /// when it differs from `actor_id`. Ignored for other roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

impl Caller {
    /// Build a caller with no separate patient binding.
    pub fn new(actor_id: impl Into<String>, role: Role) -> Self {
        Self {
            actor_id: actor_id.into(),
            role,
            patient_id: None,
        }
    }

    /// The patient identity this caller is scoped to when acting as a
    /// patient. Falls back to `actor_id` — the common case where a patient
    /// logs in under their own patient id.
    pub fn patient_binding(&self) -> &str {
        self.patient_id.as_deref().unwrap_or(&self.actor_id)
    }
}
