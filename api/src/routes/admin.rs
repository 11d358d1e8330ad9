use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get, routing::patch, routing::post};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use maturis_core::diagnostic::MaturityLevel;
use maturis_core::submission::{STATUS_COMPLETED, STATUS_DELETED};

use crate::auth::AdminGate;
use crate::error::AppError;
use crate::state::AppState;

/// Allowed CRM follow-up states, in pipeline order.
const CRM_STATUSES: &[&str] = &["new", "contacted", "qualified", "converted", "closed"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/diagnostics", get(list_diagnostics))
        .route("/v1/admin/stats", get(stats))
        .route("/v1/admin/export", get(export_csv))
        .route(
            "/v1/admin/diagnostics/{id}",
            get(diagnostic_detail).delete(delete_diagnostic),
        )
        .route("/v1/admin/diagnostics/{id}/crm", patch(update_crm))
        .route("/v1/admin/diagnostics/{id}/restore", post(restore_diagnostic))
}

// --- Shared row shapes ---

/// Flattened diagnostic row for the admin table: diagnostic fields joined
/// with its organization and respondent. Orphaned links render as empty
/// strings rather than failing the listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDiagnosticRow {
    pub id: Uuid,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_score: i32,
    pub maturity_level: String,
    pub status: String,
    pub axis_scores: serde_json::Value,
    pub crm_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_notes: Option<String>,
    pub org_name: String,
    pub sector: String,
    pub country: String,
    pub size: String,
    pub respondent_name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DiagnosticJoinRow {
    id: Uuid,
    completed_at: Option<DateTime<Utc>>,
    total_score: i32,
    maturity_level: String,
    status: String,
    axis_scores: serde_json::Value,
    crm_status: String,
    crm_notes: Option<String>,
    org_name: Option<String>,
    sector: Option<String>,
    country: Option<String>,
    size: Option<String>,
    respondent_name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    phone: Option<String>,
}

impl DiagnosticJoinRow {
    fn into_row(self) -> AdminDiagnosticRow {
        AdminDiagnosticRow {
            id: self.id,
            completed_at: self.completed_at,
            total_score: self.total_score,
            maturity_level: self.maturity_level,
            status: self.status,
            axis_scores: self.axis_scores,
            crm_status: self.crm_status,
            crm_notes: self.crm_notes,
            org_name: self.org_name.unwrap_or_default(),
            sector: self.sector.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            respondent_name: self.respondent_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            phone: self.phone,
        }
    }
}

const JOINED_SELECT: &str = r#"
    SELECT d.id, d.completed_at, d.total_score, d.maturity_level, d.status,
           d.axis_scores, d.crm_status, d.crm_notes,
           o.name AS org_name, o.sector, o.country, o.size,
           r.name AS respondent_name, r.email, r.role, r.phone
    FROM diagnostics d
    LEFT JOIN organizations o ON o.id = d.organization_id
    LEFT JOIN respondents r ON r.id = d.respondent_id
"#;

// --- Filters ---

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct AdminListParams {
    /// Filter by organization sector.
    #[serde(default)]
    pub sector: Option<String>,
    /// Filter by maturity level (debutant, intermediaire, avance, expert).
    #[serde(default)]
    pub maturity_level: Option<String>,
    /// Row status to show: defaults to "completed"; "deleted" lists the
    /// soft-deleted rows instead.
    #[serde(default)]
    pub status: Option<String>,
    /// Free-text search over organization name, respondent name, and email.
    #[serde(default)]
    pub q: Option<String>,
    /// Maximum rows to return (default 50, max 200).
    #[serde(default)]
    pub limit: Option<i64>,
    /// Cursor from a previous response's next_cursor.
    #[serde(default)]
    pub cursor: Option<String>,
}

fn validated_level(params: &AdminListParams) -> Result<Option<String>, AppError> {
    match params.maturity_level.as_deref() {
        None => Ok(None),
        Some(raw) => match MaturityLevel::parse(raw) {
            Some(level) => Ok(Some(level.as_str().to_string())),
            None => Err(AppError::Validation {
                message: format!("'{raw}' is not a maturity level"),
                field: Some("maturity_level".to_string()),
                received: Some(serde_json::Value::String(raw.to_string())),
                docs_hint: Some("Use one of: debutant, intermediaire, avance, expert".to_string()),
            }),
        },
    }
}

fn search_pattern(params: &AdminListParams) -> Option<String> {
    params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"))
}

// --- List ---

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminListResponse {
    pub data: Vec<AdminDiagnosticRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// List diagnostics for the admin table
///
/// Ordered by completion time descending with stable cursor pagination.
/// Soft-deleted rows are excluded unless `status=deleted` is requested.
#[utoipa::path(
    get,
    path = "/v1/admin/diagnostics",
    params(
        AdminListParams,
        ("x-admin-password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Paginated diagnostic rows", body = AdminListResponse),
        (status = 401, description = "Invalid admin password", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn list_diagnostics(
    _gate: AdminGate,
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<AdminListResponse>, AppError> {
    let status = params.status.clone().unwrap_or_else(|| STATUS_COMPLETED.to_string());
    let level = validated_level(&params)?;
    let pattern = search_pattern(&params);

    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    // Fetch one extra to determine has_more
    let fetch_limit = limit + 1;

    let cursor_data = match params.cursor.as_deref() {
        Some(cursor) => Some(decode_cursor(cursor)?),
        None => None,
    };

    let rows: Vec<DiagnosticJoinRow> = if let Some(cursor) = cursor_data {
        sqlx::query_as(&format!(
            r#"{JOINED_SELECT}
            WHERE d.status = $1
              AND ($2::text IS NULL OR o.sector = $2)
              AND ($3::text IS NULL OR d.maturity_level = $3)
              AND ($4::text IS NULL OR o.name ILIKE $4 OR r.name ILIKE $4 OR r.email ILIKE $4)
              AND (d.completed_at, d.id) < ($5, $6)
            ORDER BY d.completed_at DESC, d.id DESC
            LIMIT $7
            "#
        ))
        .bind(&status)
        .bind(&params.sector)
        .bind(&level)
        .bind(&pattern)
        .bind(cursor.completed_at)
        .bind(cursor.id)
        .bind(fetch_limit)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as(&format!(
            r#"{JOINED_SELECT}
            WHERE d.status = $1
              AND ($2::text IS NULL OR o.sector = $2)
              AND ($3::text IS NULL OR d.maturity_level = $3)
              AND ($4::text IS NULL OR o.name ILIKE $4 OR r.name ILIKE $4 OR r.email ILIKE $4)
            ORDER BY d.completed_at DESC, d.id DESC
            LIMIT $5
            "#
        ))
        .bind(&status)
        .bind(&params.sector)
        .bind(&level)
        .bind(&pattern)
        .bind(fetch_limit)
        .fetch_all(&state.db)
        .await?
    };

    let has_more = rows.len() as i64 > limit;
    let data: Vec<AdminDiagnosticRow> = rows
        .into_iter()
        .take(limit as usize)
        .map(DiagnosticJoinRow::into_row)
        .collect();

    let next_cursor = if has_more {
        data.last()
            .and_then(|row| row.completed_at.map(|at| encode_cursor(&at, &row.id)))
    } else {
        None
    };

    Ok(Json(AdminListResponse {
        data,
        next_cursor,
        has_more,
    }))
}

// --- Stats ---

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStatsResponse {
    pub total: i64,
    /// Average overall percentage across completed diagnostics, rounded.
    pub avg_score: i64,
    pub sector_counts: BTreeMap<String, i64>,
    /// Share of diagnostics classified avance or expert, in percent.
    pub advanced_percent: i64,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_score: i32,
    maturity_level: String,
    sector: Option<String>,
}

/// Aggregate stats over completed diagnostics
#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    params(("x-admin-password" = String, Header, description = "Admin password")),
    responses(
        (status = 200, description = "Aggregate stats", body = AdminStatsResponse),
        (status = 401, description = "Invalid admin password", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn stats(
    _gate: AdminGate,
    State(state): State<AppState>,
) -> Result<Json<AdminStatsResponse>, AppError> {
    let rows: Vec<StatsRow> = sqlx::query_as(
        r#"
        SELECT d.total_score, d.maturity_level, o.sector
        FROM diagnostics d
        LEFT JOIN organizations o ON o.id = d.organization_id
        WHERE d.status = $1
        "#,
    )
    .bind(STATUS_COMPLETED)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(compute_stats(&rows)))
}

fn compute_stats(rows: &[StatsRow]) -> AdminStatsResponse {
    let total = rows.len() as i64;

    let avg_score = if total > 0 {
        let sum: i64 = rows.iter().map(|r| r.total_score as i64).sum();
        (sum as f64 / total as f64).round() as i64
    } else {
        0
    };

    let mut sector_counts = BTreeMap::new();
    for row in rows {
        if let Some(sector) = row.sector.as_deref().filter(|s| !s.is_empty()) {
            *sector_counts.entry(sector.to_string()).or_insert(0) += 1;
        }
    }

    let advanced = rows
        .iter()
        .filter(|r| r.maturity_level == "avance" || r.maturity_level == "expert")
        .count() as i64;
    let advanced_percent = if total > 0 {
        ((advanced as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    };

    AdminStatsResponse {
        total,
        avg_score,
        sector_counts,
        advanced_percent,
    }
}

// --- Detail ---

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminAnswerRow {
    pub id: Uuid,
    pub question_id: Option<String>,
    pub answer_value: String,
    pub score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDiagnosticDetail {
    #[serde(flatten)]
    pub row: AdminDiagnosticRow,
    pub answers: Vec<AdminAnswerRow>,
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: Uuid,
    question_id: Option<String>,
    answer_value: String,
    score: i32,
}

/// One diagnostic with its organization, respondent, and raw answers
#[utoipa::path(
    get,
    path = "/v1/admin/diagnostics/{id}",
    params(
        ("id" = Uuid, Path, description = "Diagnostic id"),
        ("x-admin-password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Diagnostic detail", body = AdminDiagnosticDetail),
        (status = 404, description = "Unknown diagnostic", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn diagnostic_detail(
    _gate: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminDiagnosticDetail>, AppError> {
    let row: Option<DiagnosticJoinRow> = sqlx::query_as(&format!("{JOINED_SELECT} WHERE d.id = $1"))
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    let row = row.ok_or_else(|| AppError::not_found(format!("No diagnostic with id {id}")))?;

    let answers: Vec<AnswerRow> = sqlx::query_as(
        r#"
        SELECT id, question_id, answer_value, score
        FROM answers
        WHERE diagnostic_id = $1
        ORDER BY question_id
        "#,
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AdminDiagnosticDetail {
        row: row.into_row(),
        answers: answers
            .into_iter()
            .map(|a| AdminAnswerRow {
                id: a.id,
                question_id: a.question_id,
                answer_value: a.answer_value,
                score: a.score,
            })
            .collect(),
    }))
}

// --- CRM updates ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCrmRequest {
    /// New pipeline status; omitted fields are left unchanged.
    #[serde(default)]
    pub crm_status: Option<String>,
    #[serde(default)]
    pub crm_notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CrmUpdatedResponse {
    pub id: Uuid,
    pub crm_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_notes: Option<String>,
}

/// Update CRM follow-up fields on a diagnostic
#[utoipa::path(
    patch,
    path = "/v1/admin/diagnostics/{id}/crm",
    request_body = UpdateCrmRequest,
    params(
        ("id" = Uuid, Path, description = "Diagnostic id"),
        ("x-admin-password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Fields updated", body = CrmUpdatedResponse),
        (status = 400, description = "Unknown CRM status", body = maturis_core::error::ApiError),
        (status = 404, description = "Unknown diagnostic", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn update_crm(
    _gate: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCrmRequest>,
) -> Result<Json<CrmUpdatedResponse>, AppError> {
    if let Some(status) = req.crm_status.as_deref() {
        if !CRM_STATUSES.contains(&status) {
            return Err(AppError::Validation {
                message: format!("'{status}' is not a CRM status"),
                field: Some("crm_status".to_string()),
                received: Some(serde_json::Value::String(status.to_string())),
                docs_hint: Some(format!("Use one of: {}", CRM_STATUSES.join(", "))),
            });
        }
    }

    let updated: Option<(Uuid, String, Option<String>)> = sqlx::query_as(
        r#"
        UPDATE diagnostics
        SET crm_status = COALESCE($2, crm_status),
            crm_notes = COALESCE($3, crm_notes),
            updated_at = now()
        WHERE id = $1
        RETURNING id, crm_status, crm_notes
        "#,
    )
    .bind(id)
    .bind(&req.crm_status)
    .bind(&req.crm_notes)
    .fetch_optional(&state.db)
    .await?;

    let (id, crm_status, crm_notes) =
        updated.ok_or_else(|| AppError::not_found(format!("No diagnostic with id {id}")))?;

    Ok(Json(CrmUpdatedResponse {
        id,
        crm_status,
        crm_notes,
    }))
}

// --- Soft delete / restore ---

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangedResponse {
    pub id: Uuid,
    pub status: String,
}

/// Soft-delete a diagnostic (hidden from the default listing, restorable)
#[utoipa::path(
    delete,
    path = "/v1/admin/diagnostics/{id}",
    params(
        ("id" = Uuid, Path, description = "Diagnostic id"),
        ("x-admin-password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Diagnostic soft-deleted", body = StatusChangedResponse),
        (status = 404, description = "Unknown diagnostic", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_diagnostic(
    _gate: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusChangedResponse>, AppError> {
    set_status(&state, id, STATUS_DELETED).await
}

/// Restore a soft-deleted diagnostic
#[utoipa::path(
    post,
    path = "/v1/admin/diagnostics/{id}/restore",
    params(
        ("id" = Uuid, Path, description = "Diagnostic id"),
        ("x-admin-password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "Diagnostic restored", body = StatusChangedResponse),
        (status = 404, description = "Unknown diagnostic", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn restore_diagnostic(
    _gate: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusChangedResponse>, AppError> {
    set_status(&state, id, STATUS_COMPLETED).await
}

async fn set_status(
    state: &AppState,
    id: Uuid,
    status: &str,
) -> Result<Json<StatusChangedResponse>, AppError> {
    let updated: Option<(Uuid, String)> = sqlx::query_as(
        r#"
        UPDATE diagnostics
        SET status = $2,
            deleted_at = CASE WHEN $2 = 'deleted' THEN now() ELSE NULL END,
            updated_at = now()
        WHERE id = $1
        RETURNING id, status
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(&state.db)
    .await?;

    let (id, status) =
        updated.ok_or_else(|| AppError::not_found(format!("No diagnostic with id {id}")))?;

    Ok(Json(StatusChangedResponse { id, status }))
}

// --- CSV export ---

const EXPORT_HEADER: &str = "id,completed_at,org_name,sector,country,size,respondent_name,email,phone,role,total_score,maturity_level,crm_status,crm_notes";

/// Export completed diagnostics as CSV
///
/// Applies the same filters as the list endpoint, without pagination.
#[utoipa::path(
    get,
    path = "/v1/admin/export",
    params(
        AdminListParams,
        ("x-admin-password" = String, Header, description = "Admin password")
    ),
    responses(
        (status = 200, description = "CSV document", body = String, content_type = "text/csv"),
        (status = 401, description = "Invalid admin password", body = maturis_core::error::ApiError)
    ),
    tag = "admin"
)]
pub async fn export_csv(
    _gate: AdminGate,
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params.status.clone().unwrap_or_else(|| STATUS_COMPLETED.to_string());
    let level = validated_level(&params)?;
    let pattern = search_pattern(&params);

    let rows: Vec<DiagnosticJoinRow> = sqlx::query_as(&format!(
        r#"{JOINED_SELECT}
        WHERE d.status = $1
          AND ($2::text IS NULL OR o.sector = $2)
          AND ($3::text IS NULL OR d.maturity_level = $3)
          AND ($4::text IS NULL OR o.name ILIKE $4 OR r.name ILIKE $4 OR r.email ILIKE $4)
        ORDER BY d.completed_at DESC, d.id DESC
        "#
    ))
    .bind(&status)
    .bind(&params.sector)
    .bind(&level)
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    let mut csv = String::with_capacity(rows.len() * 128 + EXPORT_HEADER.len());
    csv.push_str(EXPORT_HEADER);
    csv.push('\n');
    for row in rows.into_iter().map(DiagnosticJoinRow::into_row) {
        csv.push_str(&csv_line(&row));
        csv.push('\n');
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"diagnostics.csv\"",
            ),
        ],
        csv,
    ))
}

fn csv_line(row: &AdminDiagnosticRow) -> String {
    let completed_at = row
        .completed_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_default();
    [
        row.id.to_string(),
        completed_at,
        row.org_name.clone(),
        row.sector.clone(),
        row.country.clone(),
        row.size.clone(),
        row.respondent_name.clone(),
        row.email.clone(),
        row.phone.clone().unwrap_or_default(),
        row.role.clone(),
        row.total_score.to_string(),
        row.maturity_level.clone(),
        row.crm_status.clone(),
        row.crm_notes.clone().unwrap_or_default(),
    ]
    .iter()
    .map(|field| csv_escape(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Quote a field when it contains a separator, quote, or newline; embedded
/// quotes are doubled.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// --- Cursor encoding ---

/// Cursor is base64("completed_at\0id") — opaque to the client, stable for
/// pagination over a growing table.
fn encode_cursor(completed_at: &DateTime<Utc>, id: &Uuid) -> String {
    let raw = format!("{}\0{}", completed_at.to_rfc3339(), id);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

struct CursorData {
    completed_at: DateTime<Utc>,
    id: Uuid,
}

fn decode_cursor(cursor: &str) -> Result<CursorData, AppError> {
    let invalid = |message: &str| AppError::Validation {
        message: message.to_string(),
        field: Some("cursor".to_string()),
        received: Some(serde_json::Value::String(cursor.to_string())),
        docs_hint: Some("Use the next_cursor value from a previous response".to_string()),
    };

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| invalid("Invalid cursor format"))?;

    let s = String::from_utf8(bytes).map_err(|_| invalid("Invalid cursor encoding"))?;

    let (timestamp, id) = s
        .split_once('\0')
        .ok_or_else(|| invalid("Invalid cursor structure"))?;

    let completed_at = DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| invalid("Invalid cursor timestamp"))?;

    let id = Uuid::parse_str(id).map_err(|_| invalid("Invalid cursor id"))?;

    Ok(CursorData { completed_at, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let at = DateTime::parse_from_rfc3339("2026-02-11T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = Uuid::now_v7();

        let cursor = encode_cursor(&at, &id);
        let decoded = decode_cursor(&cursor).unwrap();
        assert_eq!(decoded.completed_at, at);
        assert_eq!(decoded.id, id);
    }

    #[test]
    fn garbage_cursors_are_rejected() {
        assert!(decode_cursor("not base64!!").is_err());
        let no_separator = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("justtext");
        assert!(decode_cursor(&no_separator).is_err());
        let bad_time = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("yesterday\0abc");
        assert!(decode_cursor(&bad_time).is_err());
    }

    #[test]
    fn csv_escape_quotes_only_when_needed() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_escape(""), "");
    }

    fn sample_row() -> AdminDiagnosticRow {
        AdminDiagnosticRow {
            id: Uuid::nil(),
            completed_at: None,
            total_score: 60,
            maturity_level: "intermediaire".to_string(),
            status: "completed".to_string(),
            axis_scores: serde_json::json!([]),
            crm_status: "new".to_string(),
            crm_notes: Some("Rappeler lundi, demande \"devis\"".to_string()),
            org_name: "Transports Keita, Fils & Cie".to_string(),
            sector: "transport".to_string(),
            country: "guinée".to_string(),
            size: "11-50".to_string(),
            respondent_name: "Mory Keita".to_string(),
            email: "mory@keita.example".to_string(),
            role: "ceo".to_string(),
            phone: None,
        }
    }

    #[test]
    fn csv_line_matches_header_column_count() {
        let line = csv_line(&sample_row());
        // Naive split would miscount inside quoted fields; this row's commas
        // are all quoted, so count the unquoted separators by parsing.
        let mut in_quotes = false;
        let mut columns = 1;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => columns += 1,
                _ => {}
            }
        }
        assert_eq!(columns, EXPORT_HEADER.split(',').count());
    }

    #[test]
    fn csv_line_quotes_fields_with_separators() {
        let line = csv_line(&sample_row());
        assert!(line.contains("\"Transports Keita, Fils & Cie\""));
        assert!(line.contains("\"Rappeler lundi, demande \"\"devis\"\"\""));
    }

    #[test]
    fn stats_over_empty_input_are_all_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_score, 0);
        assert_eq!(stats.advanced_percent, 0);
        assert!(stats.sector_counts.is_empty());
    }

    #[test]
    fn stats_aggregate_scores_and_sectors() {
        let rows = vec![
            StatsRow {
                total_score: 40,
                maturity_level: "intermediaire".to_string(),
                sector: Some("transport".to_string()),
            },
            StatsRow {
                total_score: 90,
                maturity_level: "expert".to_string(),
                sector: Some("transport".to_string()),
            },
            StatsRow {
                total_score: 70,
                maturity_level: "avance".to_string(),
                sector: Some("retail".to_string()),
            },
            StatsRow {
                total_score: 20,
                maturity_level: "debutant".to_string(),
                sector: None,
            },
        ];

        let stats = compute_stats(&rows);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.avg_score, 55);
        assert_eq!(stats.sector_counts["transport"], 2);
        assert_eq!(stats.sector_counts["retail"], 1);
        assert_eq!(stats.sector_counts.len(), 2);
        assert_eq!(stats.advanced_percent, 50);
    }
}
