//! # medledger-core
//!
//! The record lifecycle manager for the MedLedger audit service, plus the
//! `LedgerStore` trait seam its storage backends implement.
//!
//! The lifecycle manager is the only write path to the ledger: it derives
//! the patient's current state from the append-only chain, enforces the
//! existence invariants (no duplicate create, no modify/delete of an absent
//! record), validates payload shape, and delegates the sealed append to the
//! store — all under a single submit lock so racing writers cannot corrupt
//! the invariants.

pub mod lifecycle;
pub mod traits;
pub mod validation;

pub use lifecycle::RecordLifecycle;
pub use traits::LedgerStore;
pub use validation::validate_payload;
