//! Entry predicates for reads.
//!
//! An `EntryFilter` is the one predicate type shared by the store, the
//! access control filter, and the query engine. Role scoping works by
//! AND-merging the caller's request into the role's predicate and handing
//! the result to `LedgerStore::list` — there is no second access check
//! downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::AuditEntry;

/// A conjunctive predicate over audit entries.
///
/// Every set field must match for an entry to pass. The default filter
/// matches everything; `EntryFilter::nothing()` matches nothing and is the
/// fail-closed result of an over-broad request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Exact match on `AuditEntry::patient_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,

    /// Exact match on `AuditEntry::actor_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    /// Case-insensitive substring match on the payload's patient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,

    /// Inclusive lower bound on `timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on `timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,

    /// Fail-closed marker: when set, no entry matches regardless of the
    /// other fields. Set via `EntryFilter::nothing()`; public so filters
    /// can be built with struct-update syntax across crates.
    #[serde(default)]
    pub match_nothing: bool,
}

impl EntryFilter {
    /// The filter that matches no entry at all.
    ///
    /// Returned by the access control filter when a caller requests a scope
    /// they may not see — an empty result, not an error.
    pub fn nothing() -> Self {
        Self {
            match_nothing: true,
            ..Self::default()
        }
    }

    /// Shorthand for an exact-patient filter.
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            ..Self::default()
        }
    }

    /// Shorthand for an exact-actor filter.
    pub fn for_actor(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            ..Self::default()
        }
    }

    /// True for the fail-closed filter.
    pub fn is_nothing(&self) -> bool {
        self.match_nothing
    }

    /// Evaluate this predicate against one entry.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if self.match_nothing {
            return false;
        }
        if let Some(pid) = &self.patient_id {
            if &entry.patient_id != pid {
                return false;
            }
        }
        if let Some(aid) = &self.actor_id {
            if &entry.actor_id != aid {
                return false;
            }
        }
        if let Some(name) = &self.patient_name {
            let want = name.to_lowercase();
            match &entry.payload.patient_name {
                Some(have) if have.to_lowercase().contains(&want) => {}
                _ => return false,
            }
        }
        if let Some(from) = &self.from {
            if entry.timestamp < *from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if entry.timestamp > *to {
                return false;
            }
        }
        true
    }
}
