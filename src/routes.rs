pub mod audio_file;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod user;

use crate::Config;
use crate::cache::ViewCache;
use crate::gateway::Gateway;
use crate::service::{ActionContext, Outcome};
use crate::session::CookieSessionStore;
use rocket::http::uri::Origin;
use rocket::http::{CookieJar, Status};
use rocket::outcome::Outcome as RequestOutcome;
use rocket::request::{self, FromRequest, Request};
use rocket::response::{self, Redirect, Responder};
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use tracing::error;

/// Everything a handler needs to run a resource action for the current
/// request: the shared gateway and view cache plus this request's cookies.
pub struct Actions<'r> {
    gateway: &'r Gateway,
    views: &'r ViewCache,
    config: &'r Config,
    jar: &'r CookieJar<'r>,
}

impl<'r> Actions<'r> {
    pub fn sessions(&self) -> CookieSessionStore<'_, 'r> {
        CookieSessionStore::new(self.jar, &self.config.session)
    }

    pub fn context<'a>(&'a self, sessions: &'a CookieSessionStore<'a, 'r>) -> ActionContext<'a> {
        ActionContext {
            gateway: self.gateway,
            sessions,
            views: self.views,
            settings: &self.config.session,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Actions<'r> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let rocket = req.rocket();
        match (rocket.state::<Gateway>(), rocket.state::<ViewCache>(), rocket.state::<Config>()) {
            (Some(gateway), Some(views), Some(config)) => RequestOutcome::Success(Actions {
                gateway,
                views,
                config,
                jar: req.cookies(),
            }),
            _ => {
                error!("gateway, view cache or config is not managed");
                RequestOutcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for Outcome<T> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Outcome::Redirect(target) => {
                let origin = Origin::parse_owned(target).map_err(|err| {
                    error!(error = %err, "redirect target is not a valid path");
                    Status::InternalServerError
                })?;
                Redirect::to(origin).respond_to(req)
            }
            Outcome::Rendered(Ok(view)) => Json(view).respond_to(req),
            Outcome::Rendered(Err(err)) => err.respond_to(req),
        }
    }
}
