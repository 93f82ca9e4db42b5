pub mod audio_file;
pub mod auth;
pub mod coordinator;
pub mod user;

use crate::cache::ViewCache;
use crate::config::SessionConfig;
use crate::error::action_error::{ActionError, GatewayResult};
use crate::gateway::Gateway;
use crate::models::session::Session;
use crate::session::SessionStore;
use rocket::http::uri::Origin;
use tracing::{error, info};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// What an action hands back to the page layer.
///
/// Navigation is a value, not a side effect: the caller decides how to issue
/// the redirect, and nothing in the action runs after producing one.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Render the current view with this result.
    Rendered(GatewayResult<T>),
    /// Transfer control to another view.
    Redirect(String),
}

impl<T> Outcome<T> {
    pub fn to_login() -> Self {
        Outcome::Redirect(LOGIN_PATH.to_string())
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(target) => Some(target),
            Outcome::Rendered(_) => None,
        }
    }
}

/// Everything an action needs, passed in explicitly.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub gateway: &'a Gateway,
    pub sessions: &'a dyn SessionStore,
    pub views: &'a ViewCache,
    pub settings: &'a SessionConfig,
}

impl<'a> ActionContext<'a> {
    /// The session to authenticate with. `None` means the action must
    /// redirect to the login page before touching the network.
    pub fn require_session(&self) -> Option<Session> {
        let session = self.sessions.read();
        if session.is_none() {
            info!("no session, redirecting to login");
        }
        session
    }

    /// Turn the result of an authenticated call into an outcome. A 401 means
    /// the backend no longer accepts the token, so the session is dropped and
    /// the user is sent back to the login page.
    pub fn settle<T>(&self, result: GatewayResult<T>) -> Outcome<T> {
        match result {
            Err(ActionError::Backend { status: 401, .. }) if self.settings.clear_on_unauthorized => {
                info!("backend rejected session token, clearing session");
                if let Err(err) = self.sessions.clear() {
                    error!(error = %err, "failed to clear rejected session");
                }
                Outcome::to_login()
            }
            other => Outcome::Rendered(other),
        }
    }
}

/// Accept a post-action redirect target only if it stays inside the app and
/// is a URI the `Location` header can carry.
pub fn local_path(target: &str) -> Option<String> {
    let target = target.trim();
    let is_local = target.starts_with('/') && !target.starts_with("//") && !target.contains('\\');
    (is_local && Origin::parse(target).is_ok()).then(|| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Harness;

    #[test]
    fn only_app_local_targets_are_accepted() {
        assert_eq!(local_path("/dashboard"), Some("/dashboard".to_string()));
        assert_eq!(local_path(" /dashboard/users "), Some("/dashboard/users".to_string()));
        assert_eq!(local_path("//evil.example"), None);
        assert_eq!(local_path("https://evil.example"), None);
        assert_eq!(local_path("/\\evil.example"), None);
        assert_eq!(local_path(""), None);
        assert_eq!(local_path("/a b"), None);
        assert_eq!(local_path("/dashboard/users?page=2"), Some("/dashboard/users?page=2".to_string()));
    }

    #[test]
    fn unauthorized_clears_session_and_redirects() {
        let harness = Harness::signed_in();
        let outcome: Outcome<()> = harness.ctx().settle(Err(ActionError::backend(401, "Could not validate credentials")));

        assert_eq!(outcome.redirect_target(), Some(LOGIN_PATH));
        assert!(!harness.sessions.exists());
    }

    #[test]
    fn unauthorized_is_reported_when_clearing_is_disabled() {
        let mut harness = Harness::signed_in();
        harness.settings.clear_on_unauthorized = false;
        let outcome: Outcome<()> = harness.ctx().settle(Err(ActionError::backend(401, "Could not validate credentials")));

        assert_eq!(outcome, Outcome::Rendered(Err(ActionError::backend(401, "Could not validate credentials"))));
        assert!(harness.sessions.exists());
    }

    #[test]
    fn other_failures_are_rendered() {
        let harness = Harness::signed_in();
        let outcome: Outcome<()> = harness.ctx().settle(Err(ActionError::Validation));
        assert_eq!(outcome, Outcome::Rendered(Err(ActionError::Validation)));
        assert!(harness.sessions.exists());
    }
}
