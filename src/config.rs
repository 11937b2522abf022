//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment, so a
//! single `from_env()` call at startup is all that's needed.

use std::env;
use std::str::FromStr;

/// Credit balance rules applied when profiles are created or fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPolicy {
    /// Balance given to a newly created profile
    pub starting_credits: i64,
    /// Stored balances below this are topped up on fetch
    pub top_up_threshold: i64,
    /// Balance written when a top-up happens
    pub top_up_credits: i64,
    /// Whether fetch tops up low balances at all
    pub top_up_enabled: bool,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            starting_credits: 1000,
            top_up_threshold: 100,
            top_up_credits: 1000,
            top_up_enabled: true,
        }
    }
}

impl CreditPolicy {
    /// Balance to keep for a stored profile read back from the database.
    pub fn balance_on_fetch(&self, stored: i64) -> i64 {
        if self.top_up_enabled && stored < self.top_up_threshold {
            self.top_up_credits
        } else {
            stored
        }
    }
}

/// Which document store backs the profile service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileBackend {
    Firestore,
    /// In-process store, for local development without GCP
    Memory,
}

impl FromStr for ProfileBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("PROFILE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    pub profile_backend: ProfileBackend,
    pub credit_policy: CreditPolicy,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            profile_backend: ProfileBackend::Memory,
            credit_policy: CreditPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = CreditPolicy::default();
        let credit_policy = CreditPolicy {
            starting_credits: parse_or("STARTING_CREDITS", defaults.starting_credits)?,
            top_up_threshold: parse_or("CREDIT_TOP_UP_THRESHOLD", defaults.top_up_threshold)?,
            top_up_credits: parse_or("CREDIT_TOP_UP_AMOUNT", defaults.top_up_credits)?,
            top_up_enabled: parse_or("CREDIT_TOP_UP_ENABLED", defaults.top_up_enabled)?,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            profile_backend: parse_or("PROFILE_BACKEND", ProfileBackend::Firestore)?,
            credit_policy,
        })
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
