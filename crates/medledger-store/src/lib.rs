//! # medledger-store
//!
//! Immutable, append-only, SHA-256 hash-chained storage of audit entries.
//!
//! ## Overview
//!
//! Every action the lifecycle manager records is sealed into an
//! `AuditEntry` that links to the previous entry via its SHA-256 hash.
//! Tampering with any entry — even a single byte — breaks the chain and is
//! detected by `verify_chain`.
//!
//! Two backends implement the `LedgerStore` trait from `medledger-core`:
//! `MemoryLedger` for tests and ephemeral runs, `FileLedger` for durable
//! JSON-lines persistence.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medledger_core::traits::LedgerStore;
//! use medledger_store::MemoryLedger;
//!
//! let store = MemoryLedger::new();
//! let entry = store.append(candidate)?;
//! store.verify_chain()?;
//! ```

pub mod chain;
pub mod file;
pub mod memory;
mod state;

pub use chain::{broken_sequences, hash_entry};
pub use file::FileLedger;
pub use memory::MemoryLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use medledger_contracts::{
        Action, AuditEntry, CandidateEntry, ClinicalPayload, EntryFilter, LedgerError,
    };
    use medledger_core::traits::LedgerStore;

    use super::MemoryLedger;

    // ── Helpers ──────────────────────────────────────────────────────────────

    /// Build a candidate with a distinguishable payload.
    fn make_candidate(actor: &str, patient: &str, diagnosis: &str) -> CandidateEntry {
        CandidateEntry {
            actor_id: actor.to_string(),
            patient_id: patient.to_string(),
            action: Action::Create,
            payload: ClinicalPayload {
                patient_name: Some(format!("Patient {patient}")),
                age: Some(50),
                diagnosis: Some(diagnosis.to_string()),
                ..ClinicalPayload::default()
            },
        }
    }

    // ── Chain mechanics ──────────────────────────────────────────────────────

    /// Appending three entries produces a valid chain.
    #[test]
    fn test_hash_chain_integrity() {
        let store = MemoryLedger::new();
        store.append(make_candidate("dr-1", "P-1", "first")).unwrap();
        store.append(make_candidate("dr-1", "P-2", "second")).unwrap();
        store.append(make_candidate("dr-2", "P-3", "third")).unwrap();

        store
            .verify_chain()
            .expect("chain must be valid after sequential appends");
    }

    /// Mutating any stored entry's payload breaks the chain from that entry
    /// onward.
    #[test]
    fn test_tamper_detection() {
        let store = MemoryLedger::new();
        store.append(make_candidate("dr-1", "P-1", "a")).unwrap();
        store.append(make_candidate("dr-1", "P-2", "b")).unwrap();
        store.append(make_candidate("dr-1", "P-3", "c")).unwrap();

        // Directly mutate internal state to simulate tampering.
        {
            let mut state = store.state.lock().unwrap();
            state.entries[1].payload.diagnosis = Some("TAMPERED".to_string());
        }

        let err = store.verify_chain().unwrap_err();
        match err {
            LedgerError::ChainIntegrity { broken } => assert_eq!(broken, vec![1, 2]),
            other => panic!("expected ChainIntegrity, got {other:?}"),
        }
    }

    /// The first entry's `prev_hash` must equal the genesis sentinel.
    #[test]
    fn test_genesis_hash() {
        let store = MemoryLedger::new();
        let entry = store.append(make_candidate("dr-1", "P-1", "x")).unwrap();
        assert_eq!(entry.prev_hash, AuditEntry::GENESIS_HASH);
    }

    /// Sequence ids are 0, 1, 2, … with no gaps, and each entry links to
    /// its predecessor's hash.
    #[test]
    fn test_sequence_and_linkage() {
        let store = MemoryLedger::new();
        let a = store.append(make_candidate("dr-1", "P-1", "a")).unwrap();
        let b = store.append(make_candidate("dr-1", "P-2", "b")).unwrap();
        let c = store.append(make_candidate("dr-1", "P-3", "c")).unwrap();

        assert_eq!((a.sequence_id, b.sequence_id, c.sequence_id), (0, 1, 2));
        assert_eq!(b.prev_hash, a.entry_hash);
        assert_eq!(c.prev_hash, b.entry_hash);
    }

    /// Timestamps are monotone non-decreasing with sequence id.
    #[test]
    fn test_timestamps_monotone() {
        let store = MemoryLedger::new();
        let entries: Vec<_> = (0..5)
            .map(|i| store.append(make_candidate("dr-1", &format!("P-{i}"), "d")).unwrap())
            .collect();

        for pair in entries.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    /// An empty chain is trivially valid.
    #[test]
    fn test_verify_empty() {
        let store = MemoryLedger::new();
        store.verify_chain().expect("empty chain must be valid");
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// Append followed by a matching list returns the entry with unchanged
    /// fields and a non-empty hash (read-after-write).
    #[test]
    fn test_append_list_round_trip() {
        let store = MemoryLedger::new();
        let appended = store.append(make_candidate("dr-7", "P-42", "flu")).unwrap();

        let listed = store.list(&EntryFilter::for_patient("P-42")).unwrap();
        assert_eq!(listed.len(), 1);

        let entry = &listed[0];
        assert_eq!(entry.sequence_id, appended.sequence_id);
        assert_eq!(entry.actor_id, "dr-7");
        assert_eq!(entry.patient_id, "P-42");
        assert_eq!(entry.payload.diagnosis.as_deref(), Some("flu"));
        assert_eq!(entry.entry_hash, appended.entry_hash);
        assert!(!entry.entry_hash.is_empty());
    }

    /// `list` filters by patient and actor, preserving insertion order.
    #[test]
    fn test_list_filters() {
        let store = MemoryLedger::new();
        store.append(make_candidate("dr-1", "P-1", "a")).unwrap();
        store.append(make_candidate("dr-2", "P-1", "b")).unwrap();
        store.append(make_candidate("dr-1", "P-2", "c")).unwrap();

        let by_patient = store.list(&EntryFilter::for_patient("P-1")).unwrap();
        assert_eq!(by_patient.len(), 2);
        assert!(by_patient[0].sequence_id < by_patient[1].sequence_id);

        let by_actor = store.list(&EntryFilter::for_actor("dr-1")).unwrap();
        assert_eq!(by_actor.len(), 2);

        let nothing = store.list(&EntryFilter::nothing()).unwrap();
        assert!(nothing.is_empty());
    }

    /// The last-entry-per-patient index tracks the most recent entry.
    #[test]
    fn test_latest_for_index() {
        let store = MemoryLedger::new();
        store.append(make_candidate("dr-1", "P-1", "old")).unwrap();
        store
            .append(CandidateEntry {
                action: Action::Modify,
                ..make_candidate("dr-1", "P-1", "new")
            })
            .unwrap();

        let latest = store.latest_for("P-1").unwrap().unwrap();
        assert_eq!(latest.sequence_id, 1);
        assert_eq!(latest.payload.diagnosis.as_deref(), Some("new"));

        assert!(store.latest_for("P-9").unwrap().is_none());
    }

    /// Point lookup by sequence id.
    #[test]
    fn test_entry_lookup() {
        let store = MemoryLedger::new();
        store.append(make_candidate("dr-1", "P-1", "a")).unwrap();
        store.append(make_candidate("dr-1", "P-2", "b")).unwrap();

        assert_eq!(store.entry(1).unwrap().unwrap().patient_id, "P-2");
        assert!(store.entry(5).unwrap().is_none());
    }
}
