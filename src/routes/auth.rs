use crate::auth::SignedIn;
use crate::models::auth::LoginCredentials;
use crate::models::user::NewUser;
use crate::routes::Actions;
use crate::service::auth::AuthService;
use crate::service::{DASHBOARD_PATH, Outcome};
use rocket::FromForm;
use rocket::form::Form;
use rocket::routes;

#[derive(FromForm)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[field(name = "redirectTo")]
    pub redirect_to: Option<String>,
}

#[derive(FromForm)]
pub struct RegisterForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[field(name = "redirectTo")]
    pub redirect_to: Option<String>,
}

/// Login and register pages are for anonymous users only.
fn anonymous_only(user: Option<SignedIn>) -> Outcome<()> {
    match user {
        Some(_) => Outcome::Redirect(DASHBOARD_PATH.to_string()),
        None => Outcome::Rendered(Ok(())),
    }
}

#[rocket::get("/login")]
pub fn login_page(user: Option<SignedIn>) -> Outcome<()> {
    anonymous_only(user)
}

#[rocket::get("/register")]
pub fn register_page(user: Option<SignedIn>) -> Outcome<()> {
    anonymous_only(user)
}

#[rocket::post("/login", data = "<form>")]
pub async fn login(actions: Actions<'_>, form: Form<LoginForm>) -> Outcome<()> {
    let form = form.into_inner();
    let credentials = LoginCredentials {
        username: form.username,
        password: form.password,
    };
    let sessions = actions.sessions();
    AuthService::new(actions.context(&sessions))
        .authenticate(&credentials, form.redirect_to.as_deref())
        .await
}

#[rocket::post("/register", data = "<form>")]
pub async fn register(actions: Actions<'_>, form: Form<RegisterForm>) -> Outcome<()> {
    let form = form.into_inner();
    let new_user = NewUser {
        username: form.username,
        full_name: form.full_name,
        email: form.email,
        password: form.password,
    };
    let sessions = actions.sessions();
    AuthService::new(actions.context(&sessions))
        .register(&new_user, form.redirect_to.as_deref())
        .await
}

#[rocket::post("/logout")]
pub fn logout(actions: Actions<'_>) -> Outcome<()> {
    let sessions = actions.sessions();
    AuthService::new(actions.context(&sessions)).logout()
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login_page, register_page, login, register, logout]
}
