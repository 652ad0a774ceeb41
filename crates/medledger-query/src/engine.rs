//! The query engine: structured questions over a visible entry set.
//!
//! Every method takes an *already-scoped* `EntryFilter` (the output of
//! `medledger_access::scope`) and computes over exactly the entries that
//! filter admits. Role differences in results arise purely from the filter
//! — the engine itself performs no access checks.
//!
//! Aggregations over "current state" re-derive it from the append-only
//! scan: a patient's state is the payload of their latest visible
//! non-tombstone entry, and a visible tombstone clears it. All computation
//! is read-only, so an aborted caller simply discards partial results.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use medledger_contracts::{
    Action, AuditEntry, ClinicalPayload, EntryFilter, LedgerError, LedgerResult,
};
use medledger_core::traits::LedgerStore;

/// Aggregate view of one patient within the caller's visible slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    /// The patient's current clinical state, absent when the latest visible
    /// entry is a tombstone.
    pub current_state: Option<ClinicalPayload>,
    /// Total visible entries for this patient, tombstones included.
    pub total_logs: u64,
    /// Timestamp of the most recent visible entry.
    pub last_visit: DateTime<Utc>,
}

/// Answers counts, top-N frequency questions, last-visit lookups, and
/// per-patient summaries over a scoped view of the ledger.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn LedgerStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Most recent visible timestamp, optionally restricted to one patient.
    ///
    /// `NotFound` when the scoped view holds no matching entry.
    pub fn last_visit(
        &self,
        filter: &EntryFilter,
        patient_id: Option<&str>,
    ) -> LedgerResult<DateTime<Utc>> {
        let entries = self.visible(filter)?;
        entries
            .iter()
            .filter(|e| patient_id.map_or(true, |pid| e.patient_id == pid))
            .map(|e| e.timestamp)
            .max()
            .ok_or_else(|| LedgerError::NotFound {
                patient_id: patient_id.unwrap_or("*").to_string(),
            })
    }

    /// Top `n` diagnoses by frequency over current (non-deleted) states.
    ///
    /// Descending by count; ties broken by first-seen order in the ledger;
    /// truncated to `n`.
    pub fn top_diagnoses(
        &self,
        filter: &EntryFilter,
        n: usize,
    ) -> LedgerResult<Vec<(String, u64)>> {
        self.top_field(filter, n, |p| p.diagnosis.as_deref())
    }

    /// Top `n` medications, same algorithm as `top_diagnoses`.
    pub fn top_medications(
        &self,
        filter: &EntryFilter,
        n: usize,
    ) -> LedgerResult<Vec<(String, u64)>> {
        self.top_field(filter, n, |p| p.medication.as_deref())
    }

    /// Aggregate view of one patient: current state, visible entry count,
    /// most recent timestamp.
    ///
    /// `NotFound` when the scoped view holds no entry for `patient_id` — a
    /// patient invisible to the caller and a nonexistent patient are
    /// indistinguishable by design.
    pub fn patient_summary(
        &self,
        filter: &EntryFilter,
        patient_id: &str,
    ) -> LedgerResult<PatientSummary> {
        let entries = self.visible(filter)?;
        let mine: Vec<&AuditEntry> = entries
            .iter()
            .filter(|e| e.patient_id == patient_id)
            .collect();

        let last = mine.last().ok_or_else(|| LedgerError::NotFound {
            patient_id: patient_id.to_string(),
        })?;

        let current_state = if last.is_tombstone() {
            None
        } else {
            Some(last.payload.clone())
        };

        Ok(PatientSummary {
            patient_id: patient_id.to_string(),
            current_state,
            total_logs: mine.len() as u64,
            last_visit: last.timestamp,
        })
    }

    /// Count of visible entries matching `filter`.
    pub fn count(&self, filter: &EntryFilter) -> LedgerResult<u64> {
        Ok(self.visible(filter)?.len() as u64)
    }

    /// Count of distinct patients with a current (non-deleted) state in the
    /// visible slice.
    pub fn count_patients(&self, filter: &EntryFilter) -> LedgerResult<u64> {
        let entries = self.visible(filter)?;
        let live = live_states(&entries);
        Ok(live.values().filter(|state| state.is_some()).count() as u64)
    }

    /// Visible entries carrying a `visit_date`, most recent visit first,
    /// truncated to `n`.
    pub fn recent_visits(&self, filter: &EntryFilter, n: usize) -> LedgerResult<Vec<AuditEntry>> {
        let mut dated: Vec<AuditEntry> = self
            .visible(filter)?
            .into_iter()
            .filter(|e| e.payload.visit_date.is_some())
            .collect();
        // YYYY-MM-DD sorts correctly as text; later append wins within a day.
        dated.sort_by(|a, b| {
            b.payload
                .visit_date
                .cmp(&a.payload.visit_date)
                .then(b.sequence_id.cmp(&a.sequence_id))
        });
        dated.truncate(n);
        Ok(dated)
    }

    /// The `n` most recently appended visible entries, newest first.
    pub fn recent_entries(&self, filter: &EntryFilter, n: usize) -> LedgerResult<Vec<AuditEntry>> {
        let mut entries = self.visible(filter)?;
        entries.reverse();
        entries.truncate(n);
        Ok(entries)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn visible(&self, filter: &EntryFilter) -> LedgerResult<Vec<AuditEntry>> {
        self.store.list(filter)
    }

    /// Shared top-N machinery for `top_diagnoses` / `top_medications`.
    fn top_field(
        &self,
        filter: &EntryFilter,
        n: usize,
        extract: impl Fn(&ClinicalPayload) -> Option<&str>,
    ) -> LedgerResult<Vec<(String, u64)>> {
        let entries = self.visible(filter)?;

        // First-seen position of each value across the full visible scan,
        // used as the deterministic tie-breaker.
        let mut first_seen: HashMap<&str, u64> = HashMap::new();
        for entry in &entries {
            if let Some(value) = extract(&entry.payload).filter(|v| !v.is_empty()) {
                first_seen.entry(value).or_insert(entry.sequence_id);
            }
        }

        // Frequencies over current states only.
        let live = live_states(&entries);
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for state in live.values().flatten() {
            if let Some(value) = extract(state).filter(|v| !v.is_empty()) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1).then_with(|| {
                let fa = first_seen.get(a.0.as_str()).copied().unwrap_or(u64::MAX);
                let fb = first_seen.get(b.0.as_str()).copied().unwrap_or(u64::MAX);
                fa.cmp(&fb)
            })
        });
        ranked.truncate(n);

        debug!(candidates = ranked.len(), "top-field aggregation computed");
        Ok(ranked)
    }
}

/// Current state per patient within a visible, ascending entry slice.
///
/// `None` marks a patient whose latest visible entry is a tombstone.
fn live_states(entries: &[AuditEntry]) -> HashMap<&str, Option<&ClinicalPayload>> {
    let mut live: HashMap<&str, Option<&ClinicalPayload>> = HashMap::new();
    for entry in entries {
        let state = match entry.action {
            Action::Delete => None,
            _ => Some(&entry.payload),
        };
        live.insert(entry.patient_id.as_str(), state);
    }
    live
}
