//! Submission assembler: packages a scored diagnostic and its profile data
//! into the records the storage collaborator persists, in strict dependency
//! order.
//!
//! The write order is organization → respondent → diagnostic → answers;
//! each step's generated id feeds the next. A failure short-circuits the
//! remaining steps and is surfaced to the caller. There is no compensation
//! for rows already written; the orphan-record risk is an accepted,
//! documented limitation, and the caller-side session state is untouched so
//! the user can simply retry.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::diagnostic::{
    Answer, DiagnosticResult, DimensionScore, MaturityLevel, Organization, Respondent,
};

/// Status a freshly submitted diagnostic is stored with.
pub const STATUS_COMPLETED: &str = "completed";
/// Status a soft-deleted diagnostic carries; restore flips it back.
pub const STATUS_DELETED: &str = "deleted";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Diagnostic record as the storage collaborator accepts it. `total_score`
/// carries the weighted overall percentage, which is what the submission
/// flow has always persisted and what the admin views aggregate on.
#[derive(Debug)]
pub struct NewDiagnostic<'a> {
    pub organization_id: Uuid,
    pub respondent_id: Uuid,
    pub total_score: i32,
    pub maturity_level: MaturityLevel,
    pub axis_scores: &'a [DimensionScore],
    pub status: &'a str,
    pub completed_at: DateTime<Utc>,
}

/// One persisted answer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub diagnostic_id: Uuid,
    pub question_id: String,
    pub answer_value: String,
    pub score: i32,
}

/// The storage collaborator contract. The assembler only needs "insert and
/// hand back the generated id" for each record kind; everything else about
/// the backend (pooling, timeouts, retries) is its own concern.
pub trait DiagnosticStore: Send + Sync {
    fn insert_organization(
        &self,
        organization: &Organization,
    ) -> impl Future<Output = Result<Uuid, StoreError>> + Send;

    fn insert_respondent(
        &self,
        organization_id: Uuid,
        respondent: &Respondent,
    ) -> impl Future<Output = Result<Uuid, StoreError>> + Send;

    fn insert_diagnostic(
        &self,
        diagnostic: &NewDiagnostic<'_>,
    ) -> impl Future<Output = Result<Uuid, StoreError>> + Send;

    fn insert_answers(
        &self,
        answers: &[NewAnswer],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Run the ordered submission against a store and return the result with its
/// assigned id. Notification side effects are NOT triggered here; they are
/// fire-and-forget concerns layered on top by the caller.
pub async fn submit_diagnostic<S: DiagnosticStore>(
    store: &S,
    organization: &Organization,
    respondent: &Respondent,
    answers: &BTreeMap<String, Answer>,
    result: DiagnosticResult,
    completed_at: DateTime<Utc>,
) -> Result<DiagnosticResult, StoreError> {
    let organization_id = store.insert_organization(organization).await?;
    let respondent_id = store.insert_respondent(organization_id, respondent).await?;

    let diagnostic_id = store
        .insert_diagnostic(&NewDiagnostic {
            organization_id,
            respondent_id,
            total_score: result.percentage,
            maturity_level: result.maturity_level,
            axis_scores: &result.dimension_scores,
            status: STATUS_COMPLETED,
            completed_at,
        })
        .await?;

    let rows: Vec<NewAnswer> = answers
        .values()
        .map(|a| NewAnswer {
            diagnostic_id,
            question_id: a.question_id.clone(),
            answer_value: a.value.clone(),
            score: a.score,
        })
        .collect();

    if !rows.is_empty() {
        store.insert_answers(&rows).await?;
    }

    Ok(DiagnosticResult {
        id: Some(diagnostic_id),
        ..result
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::scoring;

    /// Records the order of store calls and can be told to fail at one step.
    #[derive(Default)]
    struct MockStore {
        calls: Mutex<Vec<&'static str>>,
        fail_on: Option<&'static str>,
    }

    impl MockStore {
        fn failing_on(step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Self::default()
            }
        }

        fn record(&self, step: &'static str) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push(step);
            if self.fail_on == Some(step) {
                Err(StoreError::Backend(format!("{step} write refused")))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DiagnosticStore for MockStore {
        async fn insert_organization(
            &self,
            _organization: &Organization,
        ) -> Result<Uuid, StoreError> {
            self.record("organization")?;
            Ok(Uuid::now_v7())
        }

        async fn insert_respondent(
            &self,
            _organization_id: Uuid,
            _respondent: &Respondent,
        ) -> Result<Uuid, StoreError> {
            self.record("respondent")?;
            Ok(Uuid::now_v7())
        }

        async fn insert_diagnostic(
            &self,
            _diagnostic: &NewDiagnostic<'_>,
        ) -> Result<Uuid, StoreError> {
            self.record("diagnostic")?;
            Ok(Uuid::now_v7())
        }

        async fn insert_answers(&self, _answers: &[NewAnswer]) -> Result<(), StoreError> {
            self.record("answers")?;
            Ok(())
        }
    }

    fn fixture() -> (Organization, Respondent, BTreeMap<String, Answer>, DiagnosticResult) {
        let organization = Organization {
            name: "Translog SA".to_string(),
            sector: "transport".to_string(),
            country: "france".to_string(),
            size: "11-50".to_string(),
        };
        let respondent = Respondent {
            name: "Awa Diallo".to_string(),
            email: "awa@translog.example".to_string(),
            phone: None,
            role: "ops".to_string(),
            consent_given: true,
        };
        let raw = BTreeMap::from([("tl_q1".to_string(), "centralized".to_string())]);
        let answers = scoring::score_submission("transport", &raw);
        let result = scoring::compute_result("transport", &answers);
        (organization, respondent, answers, result)
    }

    #[tokio::test]
    async fn successful_submission_runs_all_steps_in_order() {
        let store = MockStore::default();
        let (organization, respondent, answers, result) = fixture();

        let submitted = submit_diagnostic(
            &store,
            &organization,
            &respondent,
            &answers,
            result.clone(),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(
            store.calls(),
            vec!["organization", "respondent", "diagnostic", "answers"]
        );
        assert!(submitted.id.is_some());
        assert_eq!(submitted.percentage, result.percentage);
    }

    #[tokio::test]
    async fn respondent_failure_short_circuits_later_writes() {
        let store = MockStore::failing_on("respondent");
        let (organization, respondent, answers, result) = fixture();

        let err = submit_diagnostic(&store, &organization, &respondent, &answers, result, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.calls(), vec!["organization", "respondent"]);
    }

    #[tokio::test]
    async fn diagnostic_failure_never_reaches_answers() {
        let store = MockStore::failing_on("diagnostic");
        let (organization, respondent, answers, result) = fixture();

        submit_diagnostic(&store, &organization, &respondent, &answers, result, Utc::now())
            .await
            .unwrap_err();

        assert_eq!(store.calls(), vec!["organization", "respondent", "diagnostic"]);
    }

    #[tokio::test]
    async fn empty_answer_set_skips_the_answers_write() {
        let store = MockStore::default();
        let (organization, respondent, _, result) = fixture();

        let submitted = submit_diagnostic(
            &store,
            &organization,
            &respondent,
            &BTreeMap::new(),
            result,
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(store.calls(), vec!["organization", "respondent", "diagnostic"]);
        assert!(submitted.id.is_some());
    }
}
