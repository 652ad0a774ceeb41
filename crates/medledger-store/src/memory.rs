//! In-memory implementation of `LedgerStore`.
//!
//! The reference backend: all chain state lives in a `Mutex`-guarded
//! `ChainState`. Appends and reads each take the lock briefly; readers get
//! snapshot-at-call-time semantics and never observe a partially-written
//! entry. Suitable for tests and for running the server without a data
//! file.

use std::sync::Mutex;

use tracing::debug;

use medledger_contracts::{
    AuditEntry, CandidateEntry, EntryFilter, LedgerError, LedgerResult,
};
use medledger_core::traits::LedgerStore;

use crate::chain::broken_sequences;
use crate::state::ChainState;

/// An in-memory, append-only audit ledger backed by a SHA-256 hash chain.
pub struct MemoryLedger {
    pub(crate) state: Mutex<ChainState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChainState::new()),
        }
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, ChainState>> {
        self.state.lock().map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("ledger state lock poisoned: {e}"),
        })
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryLedger {
    fn append(&self, candidate: CandidateEntry) -> LedgerResult<AuditEntry> {
        let mut state = self.lock()?;
        let entry = state.seal(candidate);
        state.push(entry.clone());

        debug!(
            sequence_id = entry.sequence_id,
            patient_id = %entry.patient_id,
            "entry sealed into memory chain"
        );
        Ok(entry)
    }

    fn list(&self, filter: &EntryFilter) -> LedgerResult<Vec<AuditEntry>> {
        let state = self.lock()?;
        Ok(state
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    fn latest_for(&self, patient_id: &str) -> LedgerResult<Option<AuditEntry>> {
        let state = self.lock()?;
        Ok(state.latest_for(patient_id).cloned())
    }

    fn entry(&self, sequence_id: u64) -> LedgerResult<Option<AuditEntry>> {
        let state = self.lock()?;
        Ok(state.entries.get(sequence_id as usize).cloned())
    }

    fn verify_chain(&self) -> LedgerResult<()> {
        let state = self.lock()?;
        let broken = broken_sequences(&state.entries);
        if broken.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::ChainIntegrity { broken })
        }
    }
}
