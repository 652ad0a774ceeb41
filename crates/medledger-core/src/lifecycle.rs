//! The record lifecycle manager: the validated write path to the ledger.
//!
//! Every client-requested action flows through `RecordLifecycle::submit`:
//!
//!   derive current state → existence check → payload validation → append
//!
//! The existence check and the append execute under a single submit mutex,
//! so two concurrent `create` submissions for the same patient id cannot
//! both observe "no current state" — exactly one wins, the other fails with
//! `AlreadyExists`. This component never edits history: a delete is an
//! appended tombstone, a modify is an appended superseding entry.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use medledger_contracts::{
    Action, AuditEntry, CandidateEntry, ClinicalPayload, LedgerError, LedgerResult,
};

use crate::traits::LedgerStore;
use crate::validation::validate_payload;

/// Validates and sequences create/modify/delete submissions against the
/// logical current state derivable from the ledger.
///
/// Cheap to share: hold it in an `Arc` and call `submit` from any thread.
/// Reads go straight to the store; only the check-then-append window is
/// serialized.
pub struct RecordLifecycle {
    store: Arc<dyn LedgerStore>,
    /// Global append lock. Write volume is low by design, so one lock for
    /// the whole ledger beats per-patient bookkeeping.
    submit_lock: Mutex<()>,
}

impl RecordLifecycle {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            submit_lock: Mutex::new(()),
        }
    }

    /// The underlying store, for wiring read paths.
    pub fn store(&self) -> Arc<dyn LedgerStore> {
        Arc::clone(&self.store)
    }

    /// Submit one action against `patient_id` on behalf of `actor_id`.
    ///
    /// # Pipeline
    ///
    /// 1. Derive the current state for `patient_id` (latest entry; a
    ///    tombstone means "no state").
    /// 2. Existence check: `create` demands no live state
    ///    (`AlreadyExists` otherwise); `modify`/`delete` demand one
    ///    (`NotFound` otherwise).
    /// 3. Payload validation per action (`Validation` with the full field
    ///    list).
    /// 4. For `modify`, merge the partial payload over the current state so
    ///    the appended entry carries the complete new state.
    /// 5. Append. The store seals sequence, timestamp, and hashes.
    ///
    /// Steps 1–5 run under the submit lock; see the module docs.
    pub fn submit(
        &self,
        actor_id: &str,
        patient_id: &str,
        action: Action,
        payload: ClinicalPayload,
    ) -> LedgerResult<AuditEntry> {
        let _guard = self
            .submit_lock
            .lock()
            .map_err(|e| LedgerError::StoreUnavailable {
                reason: format!("submit lock poisoned: {e}"),
            })?;

        debug!(actor_id, patient_id, %action, "lifecycle submit");

        let current = self.live_entry(patient_id)?;

        match action {
            Action::Create => {
                if current.is_some() {
                    warn!(patient_id, "create rejected: record already exists");
                    return Err(LedgerError::AlreadyExists {
                        patient_id: patient_id.to_string(),
                    });
                }
            }
            Action::Modify | Action::Delete => {
                if current.is_none() {
                    warn!(patient_id, %action, "rejected: no active record");
                    return Err(LedgerError::NotFound {
                        patient_id: patient_id.to_string(),
                    });
                }
            }
        }

        validate_payload(action, &payload)?;

        let payload = match (&action, &current) {
            (Action::Modify, Some(live)) => payload.merged_over(&live.payload),
            _ => payload,
        };

        let entry = self.store.append(CandidateEntry {
            actor_id: actor_id.to_string(),
            patient_id: patient_id.to_string(),
            action,
            payload,
        })?;

        info!(
            sequence_id = entry.sequence_id,
            patient_id,
            %action,
            "entry appended"
        );

        Ok(entry)
    }

    /// The current logical clinical state for `patient_id`, or `None` when
    /// the patient was never created or was most recently tombstoned.
    pub fn current_state(&self, patient_id: &str) -> LedgerResult<Option<ClinicalPayload>> {
        Ok(self.live_entry(patient_id)?.map(|e| e.payload))
    }

    /// Resolve the patient that entry `sequence_id` concerns.
    ///
    /// Backs the by-entry-id modify/delete endpoints: the client names a
    /// ledger row, the lifecycle acts on that row's patient.
    pub fn resolve_patient(&self, sequence_id: u64) -> LedgerResult<Option<String>> {
        Ok(self.store.entry(sequence_id)?.map(|e| e.patient_id))
    }

    /// Latest non-tombstoned entry for `patient_id`, if any.
    fn live_entry(&self, patient_id: &str) -> LedgerResult<Option<AuditEntry>> {
        Ok(self
            .store
            .latest_for(patient_id)?
            .filter(|entry| !entry.is_tombstone()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
