//! Explicit wizard session state.
//!
//! One value holds everything the questionnaire accumulates across steps:
//! profile fields, contact fields, and the answer map. It is plain
//! serializable data threaded through step transitions; scoring stays a pure
//! function of `(sector, answers)` with no hidden state, and a failed
//! submission leaves the session intact for a retry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::diagnostic::{Answer, DiagnosticResult, Organization, Respondent};
use crate::scoring;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSession {
    pub current_step: u8,
    pub organization: Organization,
    pub respondent: Respondent,
    /// Keyed by question id; re-recording a question replaces its answer.
    pub answers: BTreeMap<String, Answer>,
}

impl DiagnosticSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or replace the answer for a question (upsert semantics).
    /// Question existence is not checked here; completeness is a step-level
    /// gate, not a per-answer one.
    pub fn record_answer(&mut self, answer: Answer) {
        self.answers.insert(answer.question_id.clone(), answer);
    }

    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Whether every question shown on `step` (for the session's sector) has
    /// a recorded answer. Steps without questions are trivially complete.
    pub fn step_complete(&self, step: u8) -> bool {
        catalog::questions_for_step(step, &self.organization.sector)
            .iter()
            .all(|q| self.answers.contains_key(&q.id))
    }

    pub fn next_step(&mut self) {
        self.current_step += 1;
    }

    pub fn prev_step(&mut self) {
        self.current_step = self.current_step.saturating_sub(1);
    }

    pub fn go_to_step(&mut self, step: u8) {
        self.current_step = step;
    }

    /// Score the session as it stands. Pure; does not consume or mutate the
    /// session, so a failed submission can retry from the same state.
    pub fn compute_result(&self) -> DiagnosticResult {
        scoring::compute_result(&self.organization.sector, &self.answers)
    }

    /// Clear everything and return to the first step.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::question_by_id;
    use crate::diagnostic::MaturityLevel;
    use crate::scoring::answer_single_choice;

    fn transport_session() -> DiagnosticSession {
        let mut session = DiagnosticSession::new();
        session.organization = Organization {
            name: "Translog SA".to_string(),
            sector: "transport".to_string(),
            country: "france".to_string(),
            size: "11-50".to_string(),
        };
        session
    }

    #[test]
    fn record_answer_upserts_by_question_id() {
        let mut session = transport_session();
        let q = question_by_id("transport", "tl_q1").unwrap();

        session.record_answer(answer_single_choice(q, "paper"));
        assert_eq!(session.answer("tl_q1").unwrap().score, 15);

        session.record_answer(answer_single_choice(q, "centralized"));
        assert_eq!(session.answers.len(), 1);
        assert_eq!(session.answer("tl_q1").unwrap().score, 90);
    }

    #[test]
    fn step_completeness_gate() {
        let mut session = transport_session();
        assert!(!session.step_complete(2));

        for id in ["tl_q1", "tl_q2", "tl_q3"] {
            let q = question_by_id("transport", id).unwrap();
            session.record_answer(answer_single_choice(q, &q.options[0].value));
        }
        assert!(!session.step_complete(2));

        let q4 = question_by_id("transport", "tl_q4").unwrap();
        session.record_answer(answer_single_choice(q4, "instant"));
        assert!(session.step_complete(2));

        // Profile steps carry no questions and are always complete.
        assert!(session.step_complete(0));
    }

    #[test]
    fn step_navigation_saturates_at_zero() {
        let mut session = DiagnosticSession::new();
        session.prev_step();
        assert_eq!(session.current_step, 0);
        session.next_step();
        session.next_step();
        assert_eq!(session.current_step, 2);
        session.go_to_step(5);
        assert_eq!(session.current_step, 5);
    }

    #[test]
    fn session_survives_a_failed_submission_attempt() {
        // Submission never consumes the session; compute_result borrows it.
        let mut session = transport_session();
        let q = question_by_id("transport", "tl_q1").unwrap();
        session.record_answer(answer_single_choice(q, "centralized"));

        let before = session.clone();
        let _ = session.compute_result();
        assert_eq!(session, before);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = transport_session();
        let q = question_by_id("transport", "tl_q1").unwrap();
        session.record_answer(answer_single_choice(q, "centralized"));
        session.go_to_step(4);

        session.reset();
        assert_eq!(session, DiagnosticSession::default());
    }

    #[test]
    fn compute_result_uses_the_session_sector() {
        let mut session = transport_session();
        for q in catalog::questions_for_sector("transport") {
            if let Some(best) = q.options.iter().max_by_key(|o| o.score) {
                session.record_answer(crate::scoring::score_answer(q, &best.value));
            }
        }
        let result = session.compute_result();
        assert_eq!(result.sector, "transport");
        // Count-mode question answered with a single best option keeps the
        // automation dimension below the ceiling.
        assert!(result.percentage < 100);
        assert!(matches!(
            result.maturity_level,
            MaturityLevel::Avance | MaturityLevel::Expert
        ));
    }
}
