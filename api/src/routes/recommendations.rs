use axum::extract::Query;
use axum::{Json, Router, routing::get};
use serde::Deserialize;

use maturis_core::diagnostic::MaturityLevel;
use maturis_core::recommendations::{self, SectorRecommendation};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/recommendations", get(get_recommendations))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RecommendationParams {
    /// Sector key; unknown sectors fall back to the generic table.
    #[serde(default)]
    pub sector: Option<String>,
    /// Maturity level: debutant, intermediaire, avance, or expert.
    pub level: String,
}

/// Recommendation for a sector and maturity level
#[utoipa::path(
    get,
    path = "/v1/recommendations",
    params(RecommendationParams),
    responses(
        (status = 200, description = "Matching recommendation", body = SectorRecommendation),
        (status = 400, description = "Unknown maturity level", body = maturis_core::error::ApiError)
    ),
    tag = "catalog"
)]
pub async fn get_recommendations(
    Query(params): Query<RecommendationParams>,
) -> Result<Json<SectorRecommendation>, AppError> {
    let level = MaturityLevel::parse(&params.level).ok_or_else(|| AppError::Validation {
        message: format!("'{}' is not a maturity level", params.level),
        field: Some("level".to_string()),
        received: Some(serde_json::Value::String(params.level.clone())),
        docs_hint: Some("Use one of: debutant, intermediaire, avance, expert".to_string()),
    })?;

    let sector = params.sector.as_deref().unwrap_or_default();
    Ok(Json(recommendations::recommendations_for(sector, level).clone()))
}
