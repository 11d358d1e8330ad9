use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::{AdminCredential, AppState};

/// Extractor gating the admin surface behind the `x-admin-password` header.
///
/// The credential check is a plain password comparison against startup
/// configuration; there are no admin accounts or sessions. Handlers opt in
/// by taking `AdminGate` as an argument; extraction failure short-circuits
/// with a structured 401.
pub struct AdminGate;

impl FromRequestParts<AppState> for AdminGate {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.admin == AdminCredential::Disabled {
            tracing::warn!("admin request rejected: no admin credential configured");
            return Err(AppError::Unauthorized {
                message: "Admin access is not configured on this deployment".to_string(),
            });
        }

        let presented = parts
            .headers
            .get("x-admin-password")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if presented.is_empty() || !state.admin.verify(presented) {
            return Err(AppError::Unauthorized {
                message: "Invalid or missing admin password".to_string(),
            });
        }

        Ok(AdminGate)
    }
}
