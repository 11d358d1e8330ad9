use std::net::SocketAddr;

use axum::Router;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AdminCredential;

mod auth;
mod error;
mod middleware;
mod notify;
mod routes;
mod state;
mod store;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Maturis API",
        version = "0.1.0",
        description = "Data/AI maturity diagnostic: sector questionnaires, weighted scoring, and an admin CRM over submissions."
    ),
    paths(
        routes::health::health_check,
        routes::catalog::list_questions,
        routes::catalog::reference_data,
        routes::recommendations::get_recommendations,
        routes::diagnostics::submit_diagnostic,
        routes::admin::list_diagnostics,
        routes::admin::stats,
        routes::admin::diagnostic_detail,
        routes::admin::update_crm,
        routes::admin::delete_diagnostic,
        routes::admin::restore_diagnostic,
        routes::admin::export_csv,
    ),
    components(schemas(
        HealthResponse,
        maturis_core::error::ApiError,
        maturis_core::catalog::Question,
        maturis_core::catalog::QuestionKind,
        maturis_core::catalog::QuestionOption,
        maturis_core::diagnostic::Dimension,
        maturis_core::diagnostic::MaturityLevel,
        maturis_core::diagnostic::Answer,
        maturis_core::diagnostic::DimensionScore,
        maturis_core::diagnostic::DiagnosticResult,
        maturis_core::diagnostic::Organization,
        maturis_core::diagnostic::Respondent,
        maturis_core::recommendations::SectorRecommendation,
        routes::catalog::QuestionListResponse,
        routes::catalog::ChoiceOption,
        routes::catalog::ReferenceDataResponse,
        routes::diagnostics::SubmitDiagnosticRequest,
        routes::diagnostics::SubmitDiagnosticResponse,
        routes::admin::AdminDiagnosticRow,
        routes::admin::AdminListResponse,
        routes::admin::AdminStatsResponse,
        routes::admin::AdminAnswerRow,
        routes::admin::AdminDiagnosticDetail,
        routes::admin::UpdateCrmRequest,
        routes::admin::CrmUpdatedResponse,
        routes::admin::StatusChangedResponse,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database_ok: bool,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maturis_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Catalogs and weight tables are compiled-in configuration; a defect is
    // fatal at startup, never detected at scoring time.
    maturis_core::catalog::validate_catalog().expect("question catalog failed validation");

    // Database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let admin = AdminCredential::from_env();
    if admin == AdminCredential::Disabled {
        tracing::warn!(
            "no MATURIS_ADMIN_PASSWORD(_HASH) configured; admin endpoints will reject all requests"
        );
    }

    let notifier = notify::Notifier::from_env();
    if notifier.is_none() {
        tracing::info!("MATURIS_NOTIFY_WEBHOOK_URL not set; submission notifications disabled");
    }

    let app_state = state::AppState {
        db: pool,
        admin,
        notifier,
    };

    // CORS
    let cors_layer = middleware::cors::build_cors_layer();

    // Router with per-group rate limiting
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::catalog::router().layer(middleware::rate_limit::read_layer()))
        .merge(routes::recommendations::router().layer(middleware::rate_limit::read_layer()))
        .merge(routes::diagnostics::router().layer(middleware::rate_limit::submit_layer()))
        .merge(routes::admin::router().layer(middleware::rate_limit::admin_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Maturis API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
