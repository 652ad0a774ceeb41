//! # medledger-query
//!
//! Structured analytics over a caller's visible slice of the audit ledger:
//! counts, top-N diagnosis/medication frequencies, last-visit lookups, and
//! per-patient summaries.
//!
//! The engine computes over whatever `EntryFilter` it is handed. Handing it
//! a role-scoped filter (see `medledger-access`) is what makes an auditor's
//! top-diagnoses differ from a doctor's — by construction, not by an access
//! check inside the engine.

pub mod engine;

pub use engine::{PatientSummary, QueryEngine};

// ── Tests ─────────────────────────────────────────────────────────────────────
