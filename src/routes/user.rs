use crate::models::user::{NewUser, User, UserUpdate};
use crate::routes::Actions;
use crate::service::Outcome;
use crate::service::user::UserService;
use rocket::FromForm;
use rocket::form::Form;
use rocket::routes;

#[derive(FromForm)]
pub struct NewUserForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(FromForm)]
pub struct UserUpdateForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
}

#[rocket::get("/")]
pub async fn list_users(actions: Actions<'_>) -> Outcome<Vec<User>> {
    let sessions = actions.sessions();
    UserService::new(actions.context(&sessions)).list_users().await
}

#[rocket::post("/", data = "<form>")]
pub async fn create_user(actions: Actions<'_>, form: Form<NewUserForm>) -> Outcome<()> {
    let form = form.into_inner();
    let new_user = NewUser {
        username: form.username,
        full_name: form.full_name,
        email: form.email,
        password: form.password,
    };
    let sessions = actions.sessions();
    UserService::new(actions.context(&sessions)).create_user(&new_user).await
}

#[rocket::get("/<id>")]
pub async fn get_user(actions: Actions<'_>, id: &str) -> Outcome<User> {
    let sessions = actions.sessions();
    UserService::new(actions.context(&sessions)).get_user(id).await
}

#[rocket::put("/<id>", data = "<form>")]
pub async fn put_user(actions: Actions<'_>, id: &str, form: Form<UserUpdateForm>) -> Outcome<()> {
    let form = form.into_inner();
    let update = UserUpdate {
        username: form.username,
        full_name: form.full_name,
        email: form.email,
    };
    let sessions = actions.sessions();
    UserService::new(actions.context(&sessions)).update_user(id, &update).await
}

#[rocket::delete("/<id>")]
pub async fn delete_user(actions: Actions<'_>, id: &str) -> Outcome<()> {
    let sessions = actions.sessions();
    UserService::new(actions.context(&sessions)).delete_user(id).await
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_users, create_user, get_user, put_user, delete_user]
}
