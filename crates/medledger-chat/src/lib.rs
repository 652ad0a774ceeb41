//! # medledger-chat
//!
//! The chat gateway: free-text questions mapped onto the query engine's
//! structured operations by keyword class, with the same role scoping as
//! direct reads. Unmatched questions receive a fixed non-answer — the
//! gateway never fabricates data and never surfaces internal errors to the
//! end user.

pub mod gateway;

pub use gateway::{ChatGateway, ChatReply, ChatStats, NO_ANSWER};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use medledger_contracts::{Action, Caller, ClinicalPayload, Role};
    use medledger_core::RecordLifecycle;
    use medledger_query::QueryEngine;
    use medledger_store::MemoryLedger;

    use super::{ChatGateway, NO_ANSWER};

    // ── Fixture ──────────────────────────────────────────────────────────────

    /// Three patients authored by dr-1, one of them tombstoned; one patient
    /// authored by dr-2.
    fn fixture() -> ChatGateway {
        let store = Arc::new(MemoryLedger::new());
        let lc = RecordLifecycle::new(store.clone());

        let payload = |name: &str, dx: &str, med: &str| ClinicalPayload {
            patient_name: Some(name.to_string()),
            age: Some(50),
            diagnosis: Some(dx.to_string()),
            medication: Some(med.to_string()),
            visit_date: Some("2025-04-01".to_string()),
            ..ClinicalPayload::default()
        };

        lc.submit("dr-1", "patient1", Action::Create, payload("Ada", "flu", "oseltamivir"))
            .unwrap();
        lc.submit("dr-1", "patient2", Action::Create, payload("Grace", "flu", "aspirin"))
            .unwrap();
        lc.submit("dr-1", "patient3", Action::Create, payload("Edsger", "migraine", "aspirin"))
            .unwrap();
        lc.submit("dr-1", "patient3", Action::Delete, ClinicalPayload::default())
            .unwrap();
        lc.submit("dr-2", "patient4", Action::Create, payload("Alan", "asthma", "salbutamol"))
            .unwrap();

        ChatGateway::new(QueryEngine::new(store))
    }

    fn auditor() -> Caller {
        Caller::new("aud-1", Role::Auditor)
    }

    // ── Routing ──────────────────────────────────────────────────────────────

    /// "How many patients are there?" from an auditor counts distinct
    /// patients with a current (non-deleted) state over full visibility.
    #[test]
    fn auditor_patient_count_excludes_tombstoned() {
        let gw = fixture();
        let reply = gw.route("How many patients are there?", &auditor(), None);
        assert_eq!(reply.answer, "There are 3 unique patients in the system.");
        assert!(reply.stats.is_some());
        assert!(!reply.rows.is_empty());
    }

    #[test]
    fn record_count_counts_all_visible_entries() {
        let gw = fixture();
        let reply = gw.route("how many records are logged?", &auditor(), None);
        assert_eq!(reply.answer, "There are 5 audit records logged.");
    }

    #[test]
    fn doctor_counts_only_own_entries() {
        let gw = fixture();
        let reply = gw.route(
            "How many records are there?",
            &Caller::new("dr-2", Role::Doctor),
            None,
        );
        assert_eq!(reply.answer, "There are 1 audit records logged.");
    }

    #[test]
    fn diagnosis_question_reports_most_common() {
        let gw = fixture();
        let reply = gw.route("What is the most common diagnosis?", &auditor(), None);
        assert_eq!(reply.answer, "The most common diagnosis is 'flu' with 2 patient(s).");

        let stats = reply.stats.unwrap();
        assert_eq!(stats.top_diagnoses[0], ("flu".to_string(), 2));
    }

    #[test]
    fn medication_question_reports_most_common() {
        let gw = fixture();
        let reply = gw.route("Summarize medications please", &auditor(), None);
        // "medication" keyword routes even with other words around it.
        assert!(reply.answer.contains("most common medication"));
    }

    #[test]
    fn last_visit_question_reports_timestamp() {
        let gw = fixture();
        let reply = gw.route("When was the last visit?", &auditor(), None);
        assert!(reply.answer.starts_with("The last visit was on"));
    }

    #[test]
    fn summary_question_uses_patient_hint() {
        let gw = fixture();
        let reply = gw.route("Give me a summary", &auditor(), Some("patient1"));
        assert!(reply.answer.contains("Patient ID: patient1"));
        assert!(reply.answer.contains("Name: Ada"));
        assert!(reply.answer.contains("Diagnosis: flu"));
    }

    #[test]
    fn patient_gets_own_summary_without_a_hint() {
        let gw = fixture();
        let reply = gw.route(
            "show my summary",
            &Caller::new("patient2", Role::Patient),
            None,
        );
        assert!(reply.answer.contains("Patient ID: patient2"));
        assert!(reply.answer.contains("Name: Grace"));
    }

    #[test]
    fn recent_visits_lists_dated_entries() {
        let gw = fixture();
        let reply = gw.route("show recent visits", &auditor(), None);
        assert!(reply.answer.starts_with("Recent visits:"));
        assert!(reply.answer.contains("visited on 2025-04-01"));
    }

    // ── Scoping and fail-closed behavior ─────────────────────────────────────

    /// A patient asking about another patient's record sees nothing — the
    /// scope collapses to empty, so the summary reports no records rather
    /// than leaking data.
    #[test]
    fn patient_cannot_read_another_patients_summary() {
        let gw = fixture();
        let reply = gw.route(
            "summary please",
            &Caller::new("patient1", Role::Patient),
            Some("patient2"),
        );
        assert_eq!(reply.answer, "No records found for patient ID 'patient2'.");
        assert!(reply.rows.is_empty());
    }

    #[test]
    fn patient_stats_are_scoped_to_their_own_entries() {
        let gw = fixture();
        let reply = gw.route(
            "how many records do I have?",
            &Caller::new("patient1", Role::Patient),
            None,
        );
        assert_eq!(reply.answer, "There are 1 audit records logged.");
    }

    // ── Unmatched questions ──────────────────────────────────────────────────

    #[test]
    fn unmatched_question_gets_the_fixed_non_answer() {
        let gw = fixture();
        let reply = gw.route("What's the weather like?", &auditor(), None);
        assert_eq!(reply.answer, NO_ANSWER);
        assert!(reply.stats.is_none());
        assert!(reply.rows.is_empty());
    }
}
