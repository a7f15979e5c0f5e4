//! Application settings loaded from environment variables.

use std::env;

use rand::{distributions::Alphanumeric, Rng};

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    GENERATED_JWT_SECRET_LENGTH, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration.
///
/// The JWT secret is the process-wide signing key: read once at startup and
/// immutable afterwards, so concurrent token operations need no
/// synchronization. `Config` is the seam a multi-instance deployment would
/// replace to source the key from a shared secret store.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// When `JWT_SECRET` is unset a random key is generated for the process
    /// lifetime; every outstanding token becomes invalid on restart.
    ///
    /// # Panics
    /// Panics if a configured JWT_SECRET is shorter than the minimum length.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!(
                "JWT_SECRET not set, generating an in-memory signing key; \
                 tokens will not survive a restart"
            );
            generate_signing_key()
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Build a config with an explicit signing key (tests, embedded use).
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Generate a random alphanumeric signing key for this process.
fn generate_signing_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_JWT_SECRET_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_meets_minimum_length() {
        let key = generate_signing_key();
        assert!(key.len() >= MIN_JWT_SECRET_LENGTH);
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_signing_key(), generate_signing_key());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::with_secret("test-secret-key-minimum-32-chars!!");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
