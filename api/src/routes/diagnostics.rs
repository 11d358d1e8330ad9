use std::collections::BTreeMap;
use std::sync::OnceLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing::post};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use maturis_core::diagnostic::{DiagnosticResult, Organization, Respondent};
use maturis_core::recommendations::{self, SectorRecommendation};
use maturis_core::scoring;
use maturis_core::submission;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::PgStore;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/diagnostics", post(submit_diagnostic))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitDiagnosticRequest {
    pub organization: Organization,
    pub respondent: Respondent,
    /// Raw answer values keyed by question id. Single-choice answers carry
    /// the selected option value; multi-choice answers the comma-joined
    /// selection set. Scores are derived server-side from the catalog.
    pub answers: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitDiagnosticResponse {
    pub result: DiagnosticResult,
    pub recommendation: SectorRecommendation,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn require(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(
            format!("{field} must not be empty"),
            Some(field),
        ));
    }
    Ok(())
}

fn validate_submission(req: &SubmitDiagnosticRequest) -> Result<(), AppError> {
    require(&req.organization.name, "organization.name")?;
    require(&req.organization.sector, "organization.sector")?;
    require(&req.organization.country, "organization.country")?;
    require(&req.organization.size, "organization.size")?;
    require(&req.respondent.name, "respondent.name")?;
    require(&req.respondent.role, "respondent.role")?;

    if !email_regex().is_match(&req.respondent.email) {
        return Err(AppError::Validation {
            message: "respondent.email is not a valid email address".to_string(),
            field: Some("respondent.email".to_string()),
            received: Some(serde_json::Value::String(req.respondent.email.clone())),
            docs_hint: None,
        });
    }

    if !req.respondent.consent_given {
        return Err(AppError::Validation {
            message: "Consent is required to submit a diagnostic".to_string(),
            field: Some("respondent.consent_given".to_string()),
            received: Some(serde_json::Value::Bool(false)),
            docs_hint: Some(
                "The respondent must accept the data processing consent checkbox.".to_string(),
            ),
        });
    }

    if req.answers.is_empty() {
        return Err(AppError::validation(
            "answers must not be empty",
            Some("answers"),
        ));
    }

    Ok(())
}

/// Submit a completed questionnaire
///
/// Scores the raw answers against the sector catalog, persists organization,
/// respondent, diagnostic, and answers in that order, and returns the scored
/// result with its assigned id plus the matching recommendation.
///
/// Persistence is strictly sequential; a failure aborts the remaining writes
/// and surfaces as a 500 without touching anything client-side, so the
/// caller can retry the same payload.
#[utoipa::path(
    post,
    path = "/v1/diagnostics",
    request_body = SubmitDiagnosticRequest,
    responses(
        (status = 201, description = "Diagnostic stored and scored", body = SubmitDiagnosticResponse),
        (status = 400, description = "Validation error", body = maturis_core::error::ApiError),
        (status = 500, description = "Persistence failure", body = maturis_core::error::ApiError)
    ),
    tag = "diagnostics"
)]
pub async fn submit_diagnostic(
    State(state): State<AppState>,
    Json(req): Json<SubmitDiagnosticRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submission(&req)?;

    let sector = req.organization.sector.clone();
    let answers = scoring::score_submission(&sector, &req.answers);
    if answers.is_empty() {
        return Err(AppError::Validation {
            message: "No answer matches a question of this sector's catalog".to_string(),
            field: Some("answers".to_string()),
            received: None,
            docs_hint: Some(
                "Fetch /v1/questions?sector=... and answer by question id.".to_string(),
            ),
        });
    }

    let result = scoring::compute_result(&sector, &answers);

    let store = PgStore::new(state.db.clone());
    let result = submission::submit_diagnostic(
        &store,
        &req.organization,
        &req.respondent,
        &answers,
        result,
        Utc::now(),
    )
    .await?;

    tracing::info!(
        diagnostic_id = ?result.id,
        sector = %sector,
        percentage = result.percentage,
        maturity_level = result.maturity_level.as_str(),
        answers = answers.len(),
        "diagnostic submitted"
    );

    // Fire-and-forget: the submission outcome is already decided; a dead
    // webhook must not fail or delay the response.
    if let (Some(notifier), Some(diagnostic_id)) = (state.notifier.clone(), result.id) {
        tokio::spawn(notifier.notify_submission(
            state.db.clone(),
            diagnostic_id,
            req.organization.clone(),
            req.respondent.clone(),
            result.clone(),
        ));
    }

    let recommendation = recommendations::recommendations_for(&sector, result.maturity_level);

    Ok((
        StatusCode::CREATED,
        Json(SubmitDiagnosticResponse {
            result,
            recommendation: recommendation.clone(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmitDiagnosticRequest {
        SubmitDiagnosticRequest {
            organization: Organization {
                name: "Translog SA".to_string(),
                sector: "transport".to_string(),
                country: "france".to_string(),
                size: "11-50".to_string(),
            },
            respondent: Respondent {
                name: "Awa Diallo".to_string(),
                email: "awa@translog.example".to_string(),
                phone: None,
                role: "ops".to_string(),
                consent_given: true,
            },
            answers: BTreeMap::from([("tl_q1".to_string(), "centralized".to_string())]),
        }
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(validate_submission(&valid_request()).is_ok());
    }

    #[test]
    fn missing_consent_is_rejected() {
        let mut req = valid_request();
        req.respondent.consent_given = false;
        assert!(matches!(
            validate_submission(&req),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["", "plainaddress", "a@b", "two words@site.fr", "a@@b.fr"] {
            let mut req = valid_request();
            req.respondent.email = email.to_string();
            assert!(
                validate_submission(&req).is_err(),
                "email '{email}' should be rejected"
            );
        }
    }

    #[test]
    fn reasonable_emails_are_accepted() {
        for email in ["awa@translog.example", "jean.dupont+crm@societe.fr"] {
            let mut req = valid_request();
            req.respondent.email = email.to_string();
            assert!(
                validate_submission(&req).is_ok(),
                "email '{email}' should be accepted"
            );
        }
    }

    #[test]
    fn blank_profile_fields_are_rejected() {
        let mut req = valid_request();
        req.organization.name = "   ".to_string();
        assert!(validate_submission(&req).is_err());

        let mut req = valid_request();
        req.answers.clear();
        assert!(validate_submission(&req).is_err());
    }
}
