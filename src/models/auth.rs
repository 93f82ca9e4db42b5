use rocket::serde::Deserialize;

pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Body of a successful `POST /token`.
#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl LoginCredentials {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![("username", self.username.clone()), ("password", self.password.clone())]
    }
}
