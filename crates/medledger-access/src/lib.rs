//! # medledger-access
//!
//! Fail-closed role scoping for MedLedger reads.
//!
//! The access control filter turns `(caller, requested filter)` into the
//! effective filter a read is allowed to execute. It is deny-by-default in
//! spirit: a request that would broaden a role's visibility scopes to the
//! empty result rather than erroring — matching the observed "no logs"
//! client behavior — and no read path may reach the store without passing
//! through it.

pub mod scope;

pub use scope::scope;
