use crate::config::SessionConfig;
use crate::models::session::Session;
use chrono::{DateTime, Duration, Utc};
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::time::OffsetDateTime;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session lifetime {0} cannot be represented in a cookie")]
    InvalidExpiry(Duration),
    #[error("session storage unavailable: {0}")]
    Storage(String),
}

/// Holds the single bearer token of the current browser context.
///
/// Readers never see storage faults: a failing read is reported as "no
/// session" and logged, so callers cannot tell it apart from a signed-out user.
pub trait SessionStore: Send + Sync {
    /// Store `token` for `ttl`, replacing any existing session.
    fn create(&self, token: &str, ttl: Duration) -> Result<Session, SessionError>;

    fn read(&self) -> Option<Session>;

    fn exists(&self) -> bool {
        self.read().is_some()
    }

    /// Remove the session. Clearing an absent session succeeds.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Cookie-backed store over the current request's jar.
///
/// The cookie value is the bearer token itself. Browsers do not send the
/// expiry back, so `expires_at` is only known for cookies written during the
/// current request.
pub struct CookieSessionStore<'a, 'r> {
    jar: &'a CookieJar<'r>,
    settings: &'a SessionConfig,
}

impl<'a, 'r> CookieSessionStore<'a, 'r> {
    pub fn new(jar: &'a CookieJar<'r>, settings: &'a SessionConfig) -> Self {
        CookieSessionStore { jar, settings }
    }
}

impl SessionStore for CookieSessionStore<'_, '_> {
    fn create(&self, token: &str, ttl: Duration) -> Result<Session, SessionError> {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or(SessionError::InvalidExpiry(ttl))?;
        let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()).map_err(|_| SessionError::InvalidExpiry(ttl))?;

        let cookie = Cookie::build((self.settings.cookie_name.clone(), token.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.settings.secure)
            .path("/")
            .expires(expires);
        self.jar.add(cookie);

        debug!(expires_at = %expires_at, "session created");
        Ok(Session {
            token: token.to_string(),
            expires_at: Some(expires_at),
        })
    }

    fn read(&self) -> Option<Session> {
        let cookie = self.jar.get_pending(&self.settings.cookie_name)?;
        if cookie.value().is_empty() {
            return None;
        }

        let session = Session {
            token: cookie.value().to_string(),
            expires_at: cookie
                .expires_datetime()
                .and_then(|expires| DateTime::<Utc>::from_timestamp(expires.unix_timestamp(), 0)),
        };

        if session.is_expired(Utc::now()) {
            debug!("stale session cookie discarded");
            if let Err(err) = self.clear() {
                error!(error = %err, "failed to clear stale session");
            }
            return None;
        }

        Some(session)
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.jar.remove(Cookie::build(self.settings.cookie_name.clone()).path("/"));
        Ok(())
    }
}
