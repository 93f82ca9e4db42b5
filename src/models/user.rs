use rocket::serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub disabled: bool,
}

/// Fields accepted by `POST /users/`, shared by sign-up and admin creation.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// The mutable subset of a user. Password and `disabled` are not editable here.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub full_name: String,
    pub email: String,
}

impl NewUser {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("full_name", self.full_name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
        ]
    }
}

impl UserUpdate {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("full_name", self.full_name.clone()),
            ("email", self.email.clone()),
        ]
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
