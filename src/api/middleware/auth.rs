//! JWT admission middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, ROLE_ADMIN};
use crate::errors::{AppError, AuthFailure};

/// Authenticated subject extracted from a verified token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    /// Login name; the student identifier for student accounts
    pub username: String,
    pub role: String,
}

impl CurrentUser {
    /// Check if the subject has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Token admission middleware.
///
/// Validates the bearer token on every request except CORS preflight,
/// which carries no credentials and must not be challenged. On success
/// the verified subject is injected into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthFailure::MissingToken)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AuthFailure::MissingToken)?;

    let claims = state.auth_service.verify_token(token)?;

    let current_user = CurrentUser {
        username: claims.sub,
        role: claims.role,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, rejecting other subjects.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::validation("Admin privileges required"))
    }
}
