use crate::auth::SignedIn;
use crate::cache::Collection;
use rocket::routes;
use rocket::serde::Serialize;
use rocket::serde::json::Json;

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DashboardView {
    pub views: Vec<&'static str>,
}

/// Dashboard landing page. Only the signed-in guard runs here; the views it
/// links to load their own data.
#[rocket::get("/")]
pub fn dashboard(_user: SignedIn) -> Json<DashboardView> {
    Json(DashboardView {
        views: [Collection::Users, Collection::AudioFiles].into_iter().map(Collection::view_path).collect(),
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![dashboard]
}
