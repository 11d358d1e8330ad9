use axum::extract::Query;
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use maturis_core::catalog::{self, Question};
use maturis_core::diagnostic::{COMPANY_SIZES, COUNTRIES, ROLES, SECTORS};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/questions", get(list_questions))
        .route("/v1/reference", get(reference_data))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuestionsParams {
    /// Sector whose catalog to use. Unknown or absent sectors resolve to the
    /// generic catalog.
    #[serde(default)]
    pub sector: Option<String>,
    /// Restrict to one wizard step.
    #[serde(default)]
    pub step: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionListResponse {
    pub questions: Vec<Question>,
    /// Whether the sector has a dedicated catalog (false = generic fallback).
    pub sector_specific: bool,
}

/// Questions for a sector, optionally filtered to one step
///
/// A sector either has a dedicated catalog or gets the full generic one;
/// the two are never mixed.
#[utoipa::path(
    get,
    path = "/v1/questions",
    params(ListQuestionsParams),
    responses(
        (status = 200, description = "Ordered question list", body = QuestionListResponse)
    ),
    tag = "catalog"
)]
pub async fn list_questions(
    Query(params): Query<ListQuestionsParams>,
) -> Result<Json<QuestionListResponse>, AppError> {
    let sector = params.sector.as_deref().unwrap_or_default();

    let questions: Vec<Question> = match params.step {
        Some(step) => catalog::questions_for_step(step, sector)
            .into_iter()
            .cloned()
            .collect(),
        None => catalog::questions_for_sector(sector).to_vec(),
    };

    Ok(Json(QuestionListResponse {
        questions,
        sector_specific: catalog::has_sector_questions(sector),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceDataResponse {
    pub sectors: Vec<ChoiceOption>,
    pub company_sizes: Vec<ChoiceOption>,
    pub roles: Vec<ChoiceOption>,
    pub countries: Vec<ChoiceOption>,
}

fn choices(pairs: &[(&str, &str)]) -> Vec<ChoiceOption> {
    pairs
        .iter()
        .map(|(value, label)| ChoiceOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
}

/// Select-list contents for the profile and contact steps
#[utoipa::path(
    get,
    path = "/v1/reference",
    responses(
        (status = 200, description = "Form reference data", body = ReferenceDataResponse)
    ),
    tag = "catalog"
)]
pub async fn reference_data() -> Json<ReferenceDataResponse> {
    Json(ReferenceDataResponse {
        sectors: choices(SECTORS),
        company_sizes: choices(COMPANY_SIZES),
        roles: choices(ROLES),
        countries: choices(COUNTRIES),
    })
}
