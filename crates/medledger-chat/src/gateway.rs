//! Keyword routing from free-text questions to query engine operations.
//!
//! Routing is pattern based, not intent guessing: a fixed set of keyword
//! classes maps a question onto exactly one structured operation, and
//! anything unmatched gets the canned non-answer rather than fabricated
//! data. The gateway never touches the store directly — every lookup goes
//! through `medledger_access::scope` and the query engine, so chat answers
//! obey the same role scoping as direct queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use medledger_access::scope;
use medledger_contracts::{AuditEntry, Caller, EntryFilter, LedgerError, LedgerResult, Role};
use medledger_query::QueryEngine;

/// The fixed response for questions no keyword class matches.
pub const NO_ANSWER: &str = "Sorry, I couldn't find an answer to that question.";

/// The fixed response when a lookup fails mid-route.
const PROCESSING_ERROR: &str = "Error processing your request.";

/// How many top diagnoses/medications the stat block carries.
const TOP_N: usize = 5;

/// How many context rows accompany an answer.
const CONTEXT_ROWS: usize = 10;

/// Headline statistics accompanying a chat answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStats {
    pub total_logs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<DateTime<Utc>>,
    pub top_diagnoses: Vec<(String, u64)>,
    pub top_medications: Vec<(String, u64)>,
}

/// A routed chat reply: the answer text plus optional supporting data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ChatStats>,
    pub rows: Vec<AuditEntry>,
}

impl ChatReply {
    fn bare(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            stats: None,
            rows: Vec::new(),
        }
    }
}

/// Maps a free-text question plus optional patient hint onto one query
/// engine operation.
#[derive(Clone)]
pub struct ChatGateway {
    query: QueryEngine,
}

impl ChatGateway {
    pub fn new(query: QueryEngine) -> Self {
        Self { query }
    }

    /// Route `question` for `caller`.
    ///
    /// Never returns an error: lookup failures degrade to a fixed textual
    /// non-answer, and unmatched questions get `NO_ANSWER`.
    pub fn route(&self, question: &str, caller: &Caller, patient_hint: Option<&str>) -> ChatReply {
        let requested = match patient_hint {
            Some(pid) if !pid.trim().is_empty() => EntryFilter::for_patient(pid.trim()),
            _ => EntryFilter::default(),
        };
        let scoped = scope(caller, &requested);

        match self.dispatch(question, caller, patient_hint, &scoped) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, "chat lookup failed; degrading to fixed reply");
                ChatReply::bare(PROCESSING_ERROR)
            }
        }
    }

    fn dispatch(
        &self,
        question: &str,
        caller: &Caller,
        patient_hint: Option<&str>,
        scoped: &EntryFilter,
    ) -> LedgerResult<ChatReply> {
        let q = question.to_lowercase();

        // A patient's questions about "their" record need no explicit hint.
        let target = patient_hint
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| match caller.role {
                Role::Patient => Some(caller.patient_binding().to_string()),
                _ => None,
            });

        if q.contains("how many patient") {
            let n = self.query.count_patients(scoped)?;
            return self.answered(
                format!("There are {n} unique patients in the system."),
                scoped,
            );
        }

        if q.contains("how many") {
            let n = self.query.count(scoped)?;
            return self.answered(format!("There are {n} audit records logged."), scoped);
        }

        if q.contains("summary") {
            let Some(pid) = target else {
                return Ok(ChatReply::bare(NO_ANSWER));
            };
            return match self.query.patient_summary(scoped, &pid) {
                Ok(summary) => {
                    let answer = match &summary.current_state {
                        Some(state) => format!(
                            "Patient ID: {}\nName: {}\nAge/Gender: {}/{}\nDiagnosis: {}\nMedication: {}\nVisit Date: {}\nVitals: {}\nNotes: {}",
                            summary.patient_id,
                            state.patient_name.as_deref().unwrap_or("-"),
                            state.age.map_or("-".to_string(), |a| a.to_string()),
                            state.gender.as_deref().unwrap_or("-"),
                            state.diagnosis.as_deref().unwrap_or("-"),
                            state.medication.as_deref().unwrap_or("-"),
                            state.visit_date.as_deref().unwrap_or("-"),
                            state.vitals.as_deref().unwrap_or("-"),
                            state.notes.as_deref().unwrap_or("-"),
                        ),
                        None => format!(
                            "Patient ID: {} has no active record ({} historical entries).",
                            summary.patient_id, summary.total_logs
                        ),
                    };
                    self.answered(answer, scoped)
                }
                Err(LedgerError::NotFound { patient_id }) => Ok(ChatReply::bare(format!(
                    "No records found for patient ID '{patient_id}'."
                ))),
                Err(e) => Err(e),
            };
        }

        if q.contains("recent visit") {
            let visits = self.query.recent_visits(scoped, TOP_N)?;
            if visits.is_empty() {
                return Ok(ChatReply::bare("No visit records found."));
            }
            let lines: Vec<String> = visits
                .iter()
                .map(|e| {
                    format!(
                        "{} (ID: {}) visited on {}",
                        e.payload.patient_name.as_deref().unwrap_or("-"),
                        e.patient_id,
                        e.payload.visit_date.as_deref().unwrap_or("-"),
                    )
                })
                .collect();
            return self.answered(format!("Recent visits:\n{}", lines.join("\n")), scoped);
        }

        if q.contains("last visit") {
            return match self.query.last_visit(scoped, target.as_deref()) {
                Ok(ts) => self.answered(
                    format!("The last visit was on {}.", ts.to_rfc3339()),
                    scoped,
                ),
                Err(LedgerError::NotFound { .. }) => {
                    Ok(ChatReply::bare("No visit records found."))
                }
                Err(e) => Err(e),
            };
        }

        if q.contains("diagnos") {
            let top = self.query.top_diagnoses(scoped, TOP_N)?;
            let Some((dx, n)) = top.first() else {
                return Ok(ChatReply::bare("No diagnosis data available."));
            };
            let answer = format!("The most common diagnosis is '{dx}' with {n} patient(s).");
            return self.answered(answer, scoped);
        }

        if q.contains("medication") || q.contains("medicine") {
            let top = self.query.top_medications(scoped, TOP_N)?;
            let Some((med, n)) = top.first() else {
                return Ok(ChatReply::bare("No medication data available."));
            };
            let answer = format!("The most common medication is '{med}' with {n} patient(s).");
            return self.answered(answer, scoped);
        }

        debug!(question, "no keyword class matched");
        Ok(ChatReply::bare(NO_ANSWER))
    }

    /// Wrap an answer with the stat block and context rows for the scope.
    fn answered(&self, answer: String, scoped: &EntryFilter) -> LedgerResult<ChatReply> {
        Ok(ChatReply {
            answer,
            stats: Some(self.stats(scoped)?),
            rows: self.query.recent_entries(scoped, CONTEXT_ROWS)?,
        })
    }

    fn stats(&self, scoped: &EntryFilter) -> LedgerResult<ChatStats> {
        Ok(ChatStats {
            total_logs: self.query.count(scoped)?,
            last_visit: self.query.last_visit(scoped, None).ok(),
            top_diagnoses: self.query.top_diagnoses(scoped, TOP_N)?,
            top_medications: self.query.top_medications(scoped, TOP_N)?,
        })
    }
}
