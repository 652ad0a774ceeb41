//! The store trait seam between the lifecycle manager and storage backends.
//!
//! Implementations live in `medledger-store`. Keeping the trait here lets
//! the lifecycle manager be tested against mocks and lets backends be
//! swapped (in-memory for tests, file-backed for the server) without the
//! core knowing which one it drives.

use medledger_contracts::{AuditEntry, CandidateEntry, EntryFilter, LedgerResult};

/// Durable, ordered, tamper-evident storage of audit entries.
///
/// Implementations must be append-only: entries are never mutated or removed
/// once sealed into the chain. Every successful `append` is visible to
/// subsequent `list` calls (read-after-write consistency for the single
/// writer), and a failed `append` leaves the chain tip unchanged.
pub trait LedgerStore: Send + Sync {
    /// Seal `candidate` into the chain.
    ///
    /// Assigns the next `sequence_id`, stamps a monotone timestamp, links
    /// `prev_hash` to the current tip, computes `entry_hash`, persists the
    /// entry, and advances the tip — atomically. Returns `StoreUnavailable`
    /// when the durable medium cannot be written; the store is then
    /// unchanged and the operation is safe to retry.
    fn append(&self, candidate: CandidateEntry) -> LedgerResult<AuditEntry>;

    /// Entries matching `filter`, ascending by `sequence_id`.
    fn list(&self, filter: &EntryFilter) -> LedgerResult<Vec<AuditEntry>>;

    /// The most recent entry for `patient_id`, regardless of action.
    ///
    /// Backed by the last-entry-per-key index, not a reverse scan.
    fn latest_for(&self, patient_id: &str) -> LedgerResult<Option<AuditEntry>>;

    /// Point lookup by `sequence_id`.
    fn entry(&self, sequence_id: u64) -> LedgerResult<Option<AuditEntry>>;

    /// Recompute every `entry_hash` from genesis and confirm linkage.
    ///
    /// Returns `ChainIntegrity` carrying every broken sequence id. For
    /// integrity audits — not on the write hot path.
    fn verify_chain(&self) -> LedgerResult<()>;
}
