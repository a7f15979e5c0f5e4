//! Authentication service - session tokens and credential flows.
//!
//! Tokens are stateless: a signed claim set with a fixed 24-hour TTL,
//! never persisted and never revocable before expiry. Logout is a
//! client-side action; the server keeps no session table.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Account, AccountResponse, Password};
use crate::errors::{AppError, AppResult, AuthFailure};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username (the student identifier for student accounts)
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Login result: token plus an account summary (never the digest)
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub account: AccountResponse,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a session token
    async fn login(&self, username: String, password: String) -> AppResult<LoginResponse>;

    /// Change a password after verifying the current one; the new
    /// password must pass the strength policy. Clears the first-login flag.
    async fn change_password(
        &self,
        username: &str,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Account summary for an already-authenticated subject
    async fn account_info(&self, username: &str) -> AppResult<AccountResponse>;

    /// List all accounts (admin)
    async fn list_accounts(&self) -> AppResult<Vec<AccountResponse>>;

    /// Get one account by ID (admin)
    async fn get_account(&self, id: Uuid) -> AppResult<AccountResponse>;

    /// Delete an account by ID (admin)
    async fn delete_account(&self, id: Uuid) -> AppResult<()>;

    /// Verify a token's signature and expiry and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Verify a token and return only its subject.
    ///
    /// Applies the same validation as `verify_token`; used by handlers
    /// that need the subject again after the admission middleware ran.
    fn subject_of(&self, token: &str) -> AppResult<String>;
}

/// Generate a signed token for an account (shared helper)
fn generate_token(account: &Account, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: account.username.clone(),
        role: account.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )
    .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify a token and extract claims, mapping every failure mode onto
/// the admission taxonomy (shared helper).
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Auth(classify_jwt_error(&e)))?;

    Ok(token_data.claims)
}

/// Map jsonwebtoken failures onto the six-way taxonomy clients branch on.
fn classify_jwt_error(e: &jsonwebtoken::errors::Error) -> AuthFailure {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        ErrorKind::InvalidSignature => AuthFailure::BadSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => AuthFailure::Unsupported,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthFailure::Malformed,
        _ => AuthFailure::Other,
    }
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, username: String, password: String) -> AppResult<LoginResponse> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation("Username and password must not be empty"));
        }

        let account_result = self.uow.accounts().find_by_username(&username).await?;

        // SECURITY: Perform password verification even if the account does
        // not exist to prevent timing attacks that enumerate usernames.
        let dummy_digest =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let digest = account_result
            .as_ref()
            .map(|a| a.password_digest.as_str())
            .unwrap_or(dummy_digest);

        let stored = Password::from_digest(digest.to_string());
        let password_valid = stored.verify(&password);

        let account = match account_result {
            Some(account) if password_valid => account,
            _ => return Err(AppError::InvalidCredentials),
        };

        let token = generate_token(&account, &self.config)?;

        tracing::info!(username = %account.username, "login succeeded");

        Ok(LoginResponse {
            token,
            account: AccountResponse::from(account),
        })
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(AppError::validation(
                "Current and new password must not be empty",
            ));
        }

        let account = self
            .uow
            .accounts()
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound("Account"))?;

        let stored = Password::from_digest(account.password_digest.clone());
        if !stored.verify(&current_password) {
            return Err(AppError::validation("Current password is incorrect"));
        }

        // The strength policy applies to user-chosen passwords only; the
        // seeded default never passes through here.
        if !Password::meets_policy(&new_password) {
            return Err(AppError::WeakPassword);
        }

        let digest = Password::new(&new_password)?.into_string();
        self.uow
            .accounts()
            .update_password(username, digest)
            .await?;

        tracing::info!(username, "password changed, first-login flag cleared");
        Ok(())
    }

    async fn account_info(&self, username: &str) -> AppResult<AccountResponse> {
        let account = self
            .uow
            .accounts()
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound("Account"))?;

        Ok(AccountResponse::from(account))
    }

    async fn list_accounts(&self) -> AppResult<Vec<AccountResponse>> {
        let accounts = self.uow.accounts().list().await?;
        Ok(accounts.into_iter().map(AccountResponse::from).collect())
    }

    async fn get_account(&self, id: Uuid) -> AppResult<AccountResponse> {
        let account = self
            .uow
            .accounts()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Account"))?;

        Ok(AccountResponse::from(account))
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<()> {
        self.uow.accounts().delete(id).await
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    fn subject_of(&self, token: &str) -> AppResult<String> {
        Ok(self.verify_token(token)?.sub)
    }
}
