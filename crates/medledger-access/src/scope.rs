//! Role scoping: merging a caller's request into their role's visibility.
//!
//! Scoping algorithm:
//!
//! 1. Start from the role's visibility predicate:
//!    - doctor  → entries the caller authored (`actor_id` = caller)
//!    - auditor → all entries, unrestricted
//!    - patient → entries about the caller's bound patient identity
//! 2. AND-merge the caller's requested filter. A request that would widen
//!    the role predicate — a patient asking for a different patient id, a
//!    doctor asking for another doctor's authorship — collapses to the
//!    match-nothing filter. Fail-closed: an empty result, never an error.
//!
//! This is a pure function over `(caller, requested)`. Every read path —
//! log listing, analytics, chat — must pass its filter through here before
//! touching the store; nothing downstream re-checks access.

use tracing::{debug, warn};

use medledger_contracts::{Caller, EntryFilter, Role};

/// Compute the effective filter for a caller's read.
pub fn scope(caller: &Caller, requested: &EntryFilter) -> EntryFilter {
    if requested.is_nothing() {
        return EntryFilter::nothing();
    }

    let effective = match caller.role {
        // Full oversight: the request passes through untouched.
        Role::Auditor => requested.clone(),

        // Doctors see only what they themselves authored. They may narrow
        // further (by patient id, name, time), but a request for another
        // actor's entries is out of scope.
        Role::Doctor => match &requested.actor_id {
            Some(other) if other != &caller.actor_id => {
                warn!(
                    actor_id = %caller.actor_id,
                    requested_actor = %other,
                    "doctor requested foreign authorship; scoping to nothing"
                );
                EntryFilter::nothing()
            }
            _ => EntryFilter {
                actor_id: Some(caller.actor_id.clone()),
                ..requested.clone()
            },
        },

        // Patients are pinned to their bound identity. Requesting a
        // different patient id scopes to the empty result.
        Role::Patient => {
            let binding = caller.patient_binding();
            match &requested.patient_id {
                Some(other) if other != binding => {
                    warn!(
                        actor_id = %caller.actor_id,
                        requested_patient = %other,
                        "patient requested foreign patient id; scoping to nothing"
                    );
                    EntryFilter::nothing()
                }
                _ => EntryFilter {
                    patient_id: Some(binding.to_string()),
                    ..requested.clone()
                },
            }
        }
    };

    debug!(actor_id = %caller.actor_id, role = %caller.role, "scope computed");
    effective
}
