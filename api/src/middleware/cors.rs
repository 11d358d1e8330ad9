use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Build a CORS layer from the `MATURIS_CORS_ORIGINS` env var.
///
/// The questionnaire widget is embedded on marketing sites, so the allowed
/// origins are deployment configuration:
/// - Origins: comma-separated list (default: `http://localhost:3000`)
/// - Methods: GET, POST, PATCH, DELETE, OPTIONS
/// - Headers: Content-Type, x-admin-password
/// - Max age: 3600s
pub fn build_cors_layer() -> CorsLayer {
    let origins_str = std::env::var("MATURIS_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<HeaderValue>().ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-admin-password"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}
