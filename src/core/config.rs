//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.

use crate::core::auth::cookie::CookieSettings;
use crate::core::auth::jwt::{JwtConfig, JwtError};
use crate::core::auth::password::DEFAULT_BCRYPT_COST;
use crate::core::db::{DbConfig, DbError};
use crate::core::validation::{DEFAULT_MIN_PASSWORD_LENGTH, PasswordPolicy};

/// Address the server listens on when `BIND_ADDR` is unset
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// `APP_ENV` values that turn on secure cookies
const PRODUCTION_ENVS: &[&str] = &["production", "prod", "release"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address to bind, e.g. `0.0.0.0:8080`
    pub bind_addr: String,

    /// Deployment environment name from `APP_ENV`
    pub app_env: String,

    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub cookies: CookieSettings,
    pub password_policy: PasswordPolicy,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db = DbConfig::from_lookup(&lookup)?;
        let jwt = JwtConfig::from_lookup(&lookup)?;

        let app_env = lookup("APP_ENV")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "development".to_string());
        let is_production = PRODUCTION_ENVS.contains(&app_env.to_lowercase().as_str());

        let mut cookies = CookieSettings::new(is_production);
        if let Some(domain) = lookup("COOKIE_DOMAIN").filter(|s| !s.is_empty()) {
            cookies = cookies.domain(domain);
        }

        let min_length = lookup("PASSWORD_MIN_LENGTH")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH);
        let require_special = lookup("PASSWORD_REQUIRE_SPECIAL")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);
        let password_policy = PasswordPolicy::default()
            .min_length(min_length)
            .require_special(require_special);

        let bcrypt_cost = lookup("BCRYPT_COST")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BCRYPT_COST);

        Ok(Self {
            bind_addr: lookup("BIND_ADDR")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            app_env,
            db,
            jwt,
            cookies,
            password_policy,
            bcrypt_cost,
        })
    }

    /// Whether cookies are marked `Secure`
    pub fn is_production(&self) -> bool {
        self.cookies.secure
    }
}
