use crate::cache::Collection;
use crate::gateway::{GatewayRequest, segment};
use crate::models::user::{NewUser, User, UserUpdate};
use crate::service::coordinator::{AfterMutation, PostMutation};
use crate::service::{ActionContext, Outcome};
use serde::de::IgnoredAny;

const LIST_FAILED: &str = "Error getting users. Please try again.";
const GET_FAILED: &str = "Error getting user. Please try again.";
const CREATE_FAILED: &str = "Error creating new user. Please try again.";
const UPDATE_FAILED: &str = "Error updating user. Please try again.";
const DELETE_FAILED: &str = "Error deleting user. Please try again.";

pub struct UserService<'a> {
    ctx: ActionContext<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: ActionContext<'a>) -> Self {
        UserService { ctx }
    }

    /// The users list view, served from the view cache while it is fresh.
    pub async fn list_users(&self) -> Outcome<Vec<User>> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        if let Some(users) = self.ctx.views.get(Collection::Users, &session).await {
            return Outcome::Rendered(Ok(users));
        }

        let generation = self.ctx.views.generation(Collection::Users).await;
        let request = GatewayRequest::get("/users").bearer(&session.token);
        let result = self.ctx.gateway.call_objs::<User>(request, LIST_FAILED).await;
        if let Ok(users) = &result {
            self.ctx.views.put(Collection::Users, &session, generation, users).await;
        }
        self.ctx.settle(result)
    }

    pub async fn get_user(&self, id: &str) -> Outcome<User> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        let request = GatewayRequest::get(format!("/users/{}", segment(id))).bearer(&session.token);
        self.ctx.settle(self.ctx.gateway.call_obj(request, GET_FAILED).await)
    }

    pub async fn create_user(&self, new_user: &NewUser) -> Outcome<()> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        let request = GatewayRequest::post("/users/").bearer(&session.token).form(new_user.form_fields());
        self.mutate(request, CREATE_FAILED, AfterMutation::Navigate).await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Outcome<()> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        let request = GatewayRequest::put(format!("/users/{}", segment(id)))
            .bearer(&session.token)
            .form(update.form_fields());
        self.mutate(request, UPDATE_FAILED, AfterMutation::Navigate).await
    }

    /// Deleting is an in-place change of the list, so the caller stays put.
    pub async fn delete_user(&self, id: &str) -> Outcome<()> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        let request = GatewayRequest::delete(format!("/users/{}", segment(id))).bearer(&session.token);
        self.mutate(request, DELETE_FAILED, AfterMutation::Stay).await
    }

    async fn mutate(&self, request: GatewayRequest, fallback: &'static str, after: AfterMutation) -> Outcome<()> {
        match self.ctx.gateway.call::<IgnoredAny>(request, fallback).await {
            Ok(_) => PostMutation::new(self.ctx.views).complete(Collection::Users, after).await,
            Err(err) => self.ctx.settle(Err(err)),
        }
    }
}
