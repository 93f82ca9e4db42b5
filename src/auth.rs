use crate::Config;
use crate::models::session::Session;
use crate::service::LOGIN_PATH;
use crate::session::{CookieSessionStore, SessionStore};
use rocket::http::Status;
use rocket::http::uri::Origin;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket::response::Redirect;
use rocket::catch;
use tracing::debug;

/// Request guard for pages that need a signed-in user.
///
/// Fails with 401 when the session cookie is missing or stale; the catcher
/// registered under `/dashboard` turns that into a redirect to the login page.
/// Wrap in `Option` for pages that only anonymous users may see.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Session);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SignedIn {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let config = match req.rocket().state::<Config>() {
            Some(config) => config,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        match CookieSessionStore::new(req.cookies(), &config.session).read() {
            Some(session) => Outcome::Success(SignedIn(session)),
            None => {
                debug!(uri = %req.uri(), "signed-in page requested without a session");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[catch(401)]
pub fn unauthorized() -> Redirect {
    Redirect::to(Origin::path_only(LOGIN_PATH))
}
