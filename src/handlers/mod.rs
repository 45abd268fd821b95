pub mod bookings;
pub mod health;
pub mod listings;
pub mod webhook;
pub mod wizard;

use axum::http::HeaderMap;

use crate::errors::AppError;

/// Caller identity, established upstream by the auth proxy and forwarded
/// in a header.
pub fn actor_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Forbidden)
}

/// Gate for staff-only routes. An unconfigured key keeps them closed;
/// booking parties never hold this credential.
pub fn require_staff(admin_api_key: &str, headers: &HeaderMap) -> Result<(), AppError> {
    if admin_api_key.is_empty() {
        return Err(AppError::Forbidden);
    }
    let presented = headers
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented != admin_api_key {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
