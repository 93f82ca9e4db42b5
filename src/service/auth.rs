use crate::error::action_error::ActionError;
use crate::gateway::GatewayRequest;
use crate::models::auth::{AccessToken, LoginCredentials};
use crate::models::user::NewUser;
use crate::service::{ActionContext, Outcome, local_path};
use chrono::Duration;
use serde::de::IgnoredAny;
use tracing::{error, info};

const LOGIN_FAILED: &str = "Error logging in. Please try again.";
const SIGNUP_FAILED: &str = "Error signing up. Please try again.";
const SESSION_CREATE_FAILED: &str = "Error creating session. Please try again.";
const LOGOUT_FAILED: &str = "Error logging out. Please try again.";

pub struct AuthService<'a> {
    ctx: ActionContext<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: ActionContext<'a>) -> Self {
        AuthService { ctx }
    }

    /// Exchange credentials for a token and open a session with it.
    pub async fn authenticate(&self, credentials: &LoginCredentials, redirect_to: Option<&str>) -> Outcome<()> {
        let request = GatewayRequest::post("/token").form(credentials.form_fields());
        let token: AccessToken = match self.ctx.gateway.call(request, LOGIN_FAILED).await {
            Ok(token) => token,
            Err(err) => return Outcome::Rendered(Err(err)),
        };

        let Some(ttl) = Duration::try_minutes(self.ctx.settings.ttl_minutes) else {
            error!(ttl_minutes = self.ctx.settings.ttl_minutes, "session lifetime out of range");
            return Outcome::Rendered(Err(ActionError::session(SESSION_CREATE_FAILED)));
        };
        if let Err(err) = self.ctx.sessions.create(&token.access_token, ttl) {
            error!(error = %err, "failed to create session after login");
            return Outcome::Rendered(Err(ActionError::session(SESSION_CREATE_FAILED)));
        }

        info!(username = %credentials.username, "signed in");
        finish(redirect_to)
    }

    pub async fn register(&self, new_user: &NewUser, redirect_to: Option<&str>) -> Outcome<()> {
        let request = GatewayRequest::post("/users/").form(new_user.form_fields());
        if let Err(err) = self.ctx.gateway.call::<IgnoredAny>(request, SIGNUP_FAILED).await {
            return Outcome::Rendered(Err(err));
        }

        info!(username = %new_user.username, "registered");
        finish(redirect_to)
    }

    pub fn logout(&self) -> Outcome<()> {
        match self.ctx.sessions.clear() {
            Ok(()) => {
                info!("signed out");
                Outcome::to_login()
            }
            Err(err) => {
                error!(error = %err, "failed to clear session");
                Outcome::Rendered(Err(ActionError::session(LOGOUT_FAILED)))
            }
        }
    }
}

fn finish(redirect_to: Option<&str>) -> Outcome<()> {
    match redirect_to.and_then(local_path) {
        Some(target) => Outcome::Redirect(target),
        None => Outcome::Rendered(Ok(())),
    }
}
