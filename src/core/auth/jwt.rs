//! Session token issuing and verification
//!
//! Tokens are HS256 JWTs carrying the full [`SessionClaims`]. Verification
//! is a pure function of the token, the process-wide secret and the current
//! time; no storage is consulted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a session without "keep me logged in"
pub const SHORT_SESSION_HOURS: i64 = 24;

/// Lifetime of a session with "keep me logged in"
pub const EXTENDED_SESSION_HOURS: i64 = 744;

/// Default `iss` claim
pub const DEFAULT_ISSUER: &str = "tenant-auth";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token issuer, written on issue and required on verify
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from `JWT_SECRET` and `JWT_ISSUER` in an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, JwtError> {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(JwtError::MissingSecret)?;

        let mut config = Self::new(secret);
        if let Some(issuer) = lookup("JWT_ISSUER").filter(|s| !s.is_empty()) {
            config = config.issuer(issuer);
        }

        Ok(config)
    }

    /// Set issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT_SECRET environment variable not set")]
    MissingSecret,

    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::InvalidToken,
        }
    }
}

/// Requested session length, chosen by the "keep me logged in" flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifetime {
    /// 24 hours
    Short,
    /// 744 hours (31 days)
    Extended,
}

impl SessionLifetime {
    pub fn from_keep_me_logged_in(keep: bool) -> Self {
        if keep {
            SessionLifetime::Extended
        } else {
            SessionLifetime::Short
        }
    }

    pub fn hours(self) -> i64 {
        match self {
            SessionLifetime::Short => SHORT_SESSION_HOURS,
            SessionLifetime::Extended => EXTENDED_SESSION_HOURS,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::hours(self.hours())
    }

    /// Cookie max-age in seconds
    pub fn max_age_secs(self) -> i64 {
        self.duration().num_seconds()
    }
}

/// Identity and authorization data a session is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_img: String,
    pub role: String,
    pub plan: String,
}

/// Claims embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Tenant the session was issued for
    pub tenant_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_img: String,
    pub role: String,
    pub plan: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    fn new(subject: SessionSubject, issued_at: DateTime<Utc>, lifetime: SessionLifetime) -> Self {
        Self {
            sub: subject.user_id,
            tenant_id: subject.tenant_id,
            email: subject.email,
            first_name: subject.first_name,
            last_name: subject.last_name,
            profile_img: subject.profile_img,
            role: subject.role,
            plan: subject.plan,
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime.duration()).timestamp(),
        }
    }
}

/// On-the-wire claims: session claims plus issuer and token id
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    session: SessionClaims,
    iss: String,
    jti: String,
}

/// A freshly signed token and the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
    pub lifetime: SessionLifetime,
}

/// JWT service for session tokens
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Replace the signing key, leaving verification untouched
    #[cfg(test)]
    pub(crate) fn with_encoding_key(mut self, encoding_key: EncodingKey) -> Self {
        self.encoding_key = encoding_key;
        self
    }

    /// Create JWT service from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let config = JwtConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Issue a token valid from now for the given lifetime
    pub fn issue(
        &self,
        subject: SessionSubject,
        lifetime: SessionLifetime,
    ) -> Result<IssuedToken, JwtError> {
        self.issue_at(subject, lifetime, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: SessionSubject,
        lifetime: SessionLifetime,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = SessionClaims::new(subject, now, lifetime);
        let wire = TokenClaims {
            session: claims,
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &wire, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            claims: wire.session,
            lifetime,
        })
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, issuer and structure, then expiry against `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        let claims = token_data.claims.session;

        if claims.role.is_empty() || claims.exp <= claims.iat {
            return Err(JwtError::InvalidToken);
        }

        if now.timestamp() >= claims.exp {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}
