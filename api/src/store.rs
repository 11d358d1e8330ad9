use maturis_core::diagnostic::{Organization, Respondent};
use maturis_core::submission::{DiagnosticStore, NewAnswer, NewDiagnostic, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed storage collaborator.
///
/// Inserts are individual statements, NOT one wrapping transaction: the
/// submission contract is strictly ordered writes with short-circuit on
/// failure and no rollback of earlier rows. Orphaned organizations or
/// respondents from a failed submission are an accepted trade-off.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

impl DiagnosticStore for PgStore {
    async fn insert_organization(&self, organization: &Organization) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, sector, country, size)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&organization.name)
        .bind(&organization.sector)
        .bind(&organization.country)
        .bind(&organization.size)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(id)
    }

    async fn insert_respondent(
        &self,
        organization_id: Uuid,
        respondent: &Respondent,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO respondents (id, organization_id, name, email, phone, role, consent_given)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .bind(&respondent.name)
        .bind(&respondent.email)
        .bind(&respondent.phone)
        .bind(&respondent.role)
        .bind(respondent.consent_given)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(id)
    }

    async fn insert_diagnostic(&self, diagnostic: &NewDiagnostic<'_>) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        let axis_scores = serde_json::to_value(diagnostic.axis_scores)
            .map_err(|e| StoreError::Backend(format!("failed to serialize axis scores: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO diagnostics
                (id, organization_id, respondent_id, total_score, maturity_level,
                 axis_scores, status, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(diagnostic.organization_id)
        .bind(diagnostic.respondent_id)
        .bind(diagnostic.total_score)
        .bind(diagnostic.maturity_level.as_str())
        .bind(&axis_scores)
        .bind(diagnostic.status)
        .bind(diagnostic.completed_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(id)
    }

    async fn insert_answers(&self, answers: &[NewAnswer]) -> Result<(), StoreError> {
        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO answers (id, diagnostic_id, question_id, answer_value, score)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(answer.diagnostic_id)
            .bind(&answer.question_id)
            .bind(&answer.answer_value)
            .bind(answer.score)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        }
        Ok(())
    }
}
