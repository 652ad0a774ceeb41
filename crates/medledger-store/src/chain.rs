//! Hash-chain primitives: entry hashing and chain verification.
//!
//! Every field that contributes to an entry's hash is listed explicitly so
//! nothing is accidentally omitted.
//!
//! Hash input layout (bytes, in order, NUL-separated where field length is
//! ambiguous):
//!   1. sequence_id as 8-byte little-endian
//!   2. timestamp as RFC 3339 UTF-8 bytes
//!   3. actor_id as UTF-8 bytes
//!   4. patient_id as UTF-8 bytes
//!   5. action as its lowercase wire string
//!   6. canonical JSON of payload (serde_json, no pretty-printing)
//!   7. prev_hash as UTF-8 bytes (64 ASCII hex chars)

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use medledger_contracts::{Action, AuditEntry, ClinicalPayload};

/// Compute the SHA-256 hash for a single audit entry.
///
/// The hash commits to every identifying field of the entry plus its link
/// to the predecessor, so a single-byte tamper anywhere changes the digest.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `payload` cannot be serialized to JSON — which cannot happen
/// for the well-formed `ClinicalPayload` type.
pub fn hash_entry(
    sequence_id: u64,
    timestamp: &DateTime<Utc>,
    actor_id: &str,
    patient_id: &str,
    action: Action,
    payload: &ClinicalPayload,
    prev_hash: &str,
) -> String {
    // serde_json::to_vec produces deterministic output for the same value:
    // struct fields serialize in declaration order with no whitespace.
    let payload_json =
        serde_json::to_vec(payload).expect("ClinicalPayload must always serialize to JSON");

    let mut hasher = Sha256::new();
    hasher.update(sequence_id.to_le_bytes());
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update([0u8]);
    hasher.update(actor_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(patient_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(action.to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(&payload_json);
    hasher.update(prev_hash.as_bytes());

    hex::encode(hasher.finalize())
}

/// Recompute `entry.entry_hash` from its own fields and the given link.
pub fn rehash(entry: &AuditEntry, prev_hash: &str) -> String {
    hash_entry(
        entry.sequence_id,
        &entry.timestamp,
        &entry.actor_id,
        &entry.patient_id,
        entry.action,
        &entry.payload,
        prev_hash,
    )
}

/// Verify a chain, returning the sequence id of every broken entry.
///
/// Two rules are checked per entry:
///
/// 1. **Prev-hash linkage** — the stored `prev_hash` equals the hash
///    recomputed along the chain so far (or `GENESIS_HASH` for the first).
/// 2. **Hash correctness** — the stored `entry_hash` matches the value
///    recomputed from the entry's own fields and the recomputed link.
///
/// The expected link advances with the *recomputed* hash, never the stored
/// one, so a tampered entry marks itself and every entry after it as broken
/// — the chain fails from the tamper point onward. An empty chain is valid.
pub fn broken_sequences(entries: &[AuditEntry]) -> Vec<u64> {
    let mut broken = Vec::new();
    let mut expected_prev = AuditEntry::GENESIS_HASH.to_string();

    for entry in entries {
        let expected_hash = rehash(entry, &expected_prev);
        if entry.prev_hash != expected_prev || entry.entry_hash != expected_hash {
            broken.push(entry.sequence_id);
        }
        expected_prev = expected_hash;
    }

    broken
}
