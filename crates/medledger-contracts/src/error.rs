//! Error taxonomy for the MedLedger audit pipeline.
//!
//! All fallible operations across the workspace return `LedgerResult<T>`.
//! Variants carry enough context for the HTTP layer to map them to a status
//! code and for callers to act on them without string matching.

use thiserror::Error;

/// The unified error type for the MedLedger service.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A submitted payload is malformed or missing required fields.
    ///
    /// `fields` lists every offending field so the caller can fix the whole
    /// submission in one pass rather than field-by-field.
    #[error("invalid payload field(s): {}", .fields.join(", "))]
    Validation { fields: Vec<String> },

    /// A `create` was submitted for a patient that already has a live record.
    ///
    /// The caller must switch to `modify`, or `delete` first.
    #[error("patient '{patient_id}' already has an active record")]
    AlreadyExists { patient_id: String },

    /// A `modify` or `delete` targeted a patient with no live record
    /// (never created, or most recently tombstoned).
    #[error("no active record for patient '{patient_id}'")]
    NotFound { patient_id: String },

    /// The durable medium could not be written.
    ///
    /// Appends are atomic: when this is returned the chain tip is unchanged,
    /// so the operation is safe for the caller to retry.
    #[error("ledger store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// `verify_chain` detected tampering.
    ///
    /// Carries the sequence id of every entry that fails recomputation or
    /// linkage. Never silently repaired.
    #[error("audit chain broken at sequence(s): {broken:?}")]
    ChainIntegrity { broken: Vec<u64> },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the MedLedger crates.
pub type LedgerResult<T> = Result<T, LedgerError>;
