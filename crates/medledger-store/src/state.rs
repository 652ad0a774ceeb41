//! Shared in-memory chain state for the store backends.
//!
//! Both `MemoryLedger` and `FileLedger` keep the live chain here, behind
//! their own `Mutex`. The split between `seal` (build the next entry) and
//! `push` (advance the tip) is what makes durable appends atomic: the file
//! backend persists the sealed entry first and only advances the tip once
//! the bytes are on disk.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use medledger_contracts::{AuditEntry, CandidateEntry};

use crate::chain::hash_entry;

/// The mutable interior of a ledger store.
#[derive(Debug)]
pub(crate) struct ChainState {
    /// All entries in append order. `sequence_id` equals the vector index —
    /// the chain has no gaps.
    pub(crate) entries: Vec<AuditEntry>,

    /// Last-entry-per-patient index: patient id → index into `entries`.
    pub(crate) latest: HashMap<String, usize>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) next_sequence: u64,

    /// The `entry_hash` of the chain tip, or `GENESIS_HASH` before any
    /// entry exists.
    pub(crate) tip_hash: String,

    /// Timestamp of the chain tip. Appended timestamps never regress behind
    /// this, keeping them monotone with `sequence_id` even across
    /// wall-clock adjustments.
    pub(crate) tip_timestamp: DateTime<Utc>,
}

impl ChainState {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            latest: HashMap::new(),
            next_sequence: 0,
            tip_hash: AuditEntry::GENESIS_HASH.to_string(),
            tip_timestamp: DateTime::<Utc>::MIN_UTC,
        }
    }

    /// Build the next sealed entry without advancing the tip.
    pub(crate) fn seal(&self, candidate: CandidateEntry) -> AuditEntry {
        let now = Utc::now();
        let timestamp = if now < self.tip_timestamp {
            self.tip_timestamp
        } else {
            now
        };

        let sequence_id = self.next_sequence;
        let prev_hash = self.tip_hash.clone();
        let entry_hash = hash_entry(
            sequence_id,
            &timestamp,
            &candidate.actor_id,
            &candidate.patient_id,
            candidate.action,
            &candidate.payload,
            &prev_hash,
        );

        AuditEntry {
            sequence_id,
            timestamp,
            actor_id: candidate.actor_id,
            patient_id: candidate.patient_id,
            action: candidate.action,
            payload: candidate.payload,
            prev_hash,
            entry_hash,
        }
    }

    /// Advance the tip with a sealed (and, for durable backends, persisted)
    /// entry.
    pub(crate) fn push(&mut self, entry: AuditEntry) {
        self.latest
            .insert(entry.patient_id.clone(), self.entries.len());
        self.next_sequence = entry.sequence_id + 1;
        self.tip_hash = entry.entry_hash.clone();
        self.tip_timestamp = entry.timestamp;
        self.entries.push(entry);
    }

    /// The most recent entry for `patient_id`, via the index.
    pub(crate) fn latest_for(&self, patient_id: &str) -> Option<&AuditEntry> {
        self.latest.get(patient_id).map(|&idx| &self.entries[idx])
    }
}
