//! Session cookie transport
//!
//! The signed token travels in the `auth_token` cookie. Logging in or
//! registering sets it with a max-age matching the session lifetime;
//! logging out overwrites it with an empty value and a zero max-age.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::core::auth::jwt::{IssuedToken, SessionLifetime};

/// Name of the session cookie
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Attributes applied to every session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Send the cookie over HTTPS only
    pub secure: bool,
    /// Optional `Domain` attribute
    pub domain: Option<String>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            domain: None,
        }
    }
}

impl CookieSettings {
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            domain: None,
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    fn build(&self, value: String, max_age_secs: i64) -> Cookie<'static> {
        let mut builder = Cookie::build((AUTH_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age_secs));

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }

    /// Cookie carrying a token for the given lifetime
    pub fn session_cookie(&self, token: &str, lifetime: SessionLifetime) -> Cookie<'static> {
        self.build(token.to_string(), lifetime.max_age_secs())
    }

    /// Cookie instructing the client to discard the session immediately
    pub fn clearing_cookie(&self) -> Cookie<'static> {
        self.build(String::new(), 0)
    }
}

/// Add the session cookie for a freshly issued token
pub fn attach_session(jar: CookieJar, settings: &CookieSettings, issued: &IssuedToken) -> CookieJar {
    jar.add(settings.session_cookie(&issued.token, issued.lifetime))
}

/// Replace whatever session cookie the client holds with an expired one
pub fn detach_session(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(settings.clearing_cookie())
}

/// Token from the request's session cookie, if present and non-empty
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(AUTH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
