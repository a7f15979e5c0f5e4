//! Password value object - credential hashing and strength policy.
//!
//! The stored digest is a salted Argon2id PHC string. The system this
//! replaces kept unsalted MD5 hex digests; that scheme enables
//! precomputation attacks and is not carried forward.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::{MIN_PASSWORD_LENGTH, PASSWORD_SPECIAL_CHARS};
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
///
/// Immutable, compared by digest value. The plaintext never outlives
/// the constructor call.
#[derive(Clone)]
pub struct Password {
    digest: String,
}

// Don't expose the digest in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("digest", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plaintext into a new password digest.
    ///
    /// Does not apply the strength policy: the seeded default password
    /// assigned at registration is exempt. Callers accepting a
    /// *user-chosen* password must check [`Password::meets_policy`] first.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        let digest = Self::hash(plain_text)?;
        Ok(Self { digest })
    }

    /// Create a Password from an existing digest (from database).
    pub fn from_digest(digest: String) -> Self {
        Self { digest }
    }

    /// Get the digest string for storage.
    pub fn as_str(&self) -> &str {
        &self.digest
    }

    /// Consume and return the digest string.
    pub fn into_string(self) -> String {
        self.digest
    }

    /// Verify a plaintext against this digest.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_digest(plain_text, &self.digest).unwrap_or(false)
    }

    /// Strength policy for user-chosen passwords.
    ///
    /// All four conditions are mandatory: length strictly greater than 7,
    /// at least one digit, at least one letter, at least one character
    /// from the special set.
    pub fn meets_policy(candidate: &str) -> bool {
        candidate.chars().count() > MIN_PASSWORD_LENGTH
            && candidate.chars().any(|c| c.is_ascii_digit())
            && candidate.chars().any(|c| c.is_ascii_alphabetic())
            && candidate.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c))
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(digest.to_string())
    }

    fn verify_digest(plain_text: &str, digest: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| AppError::internal(format!("Invalid digest format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.digest
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for Password {}
