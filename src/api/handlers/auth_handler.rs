//! Authentication and account handlers.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::AccountResponse;
use crate::errors::AppResult;
use crate::services::LoginResponse;
use crate::types::ApiResponse;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Login name (student identifier or admin name)
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "CS2024001")]
    pub username: String,
    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "123456")]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password; must satisfy the strength policy
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Routes that must stay reachable without a token
pub fn auth_public_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Token-guarded authentication and account routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/info", get(info))
        .route("/password", put(change_password))
        .route("/accounts", get(list_accounts))
        .route("/accounts/:id", get(get_account))
        .route("/accounts/:id", delete(delete_account))
}

/// Login and get a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let login = state
        .auth_service
        .login(payload.username, payload.password)
        .await?;

    Ok(ApiResponse::success(login))
}

/// Logout.
///
/// Tokens are stateless; there is no server-side session to tear down.
/// The endpoint exists so clients have a uniform place to end a session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn logout(Extension(user): Extension<CurrentUser>) -> ApiResponse<()> {
    tracing::debug!(username = %user.username, "logout");
    ApiResponse::message("Logged out")
}

/// Account summary for the authenticated subject
#[utoipa::path(
    get,
    path = "/auth/info",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account summary", body = AccountResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn info(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state.auth_service.account_info(&user.username).await?;
    Ok(ApiResponse::success(account))
}

/// Change the authenticated subject's password
#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth_service
        .change_password(
            &user.username,
            payload.current_password,
            payload.new_password,
        )
        .await?;

    Ok(ApiResponse::message("Password changed"))
}

/// List all accounts (admin)
#[utoipa::path(
    get,
    path = "/auth/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = [AccountResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<AccountResponse>>> {
    require_admin(&user)?;
    let accounts = state.auth_service.list_accounts().await?;
    Ok(ApiResponse::success(accounts))
}

/// Get one account (admin)
#[utoipa::path(
    get,
    path = "/auth/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 400, description = "Account not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<AccountResponse>> {
    require_admin(&user)?;
    let account = state.auth_service.get_account(id).await?;
    Ok(ApiResponse::success(account))
}

/// Delete an account (admin)
#[utoipa::path(
    delete,
    path = "/auth/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&user)?;
    state.auth_service.delete_account(id).await?;
    Ok(ApiResponse::message("Account deleted"))
}
