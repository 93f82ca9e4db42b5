use crate::error::action_error::VALIDATION_MESSAGE;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Error {
    pub message: String,
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<Error> {
    Json(Error {
        message: "Not found".to_string(),
    })
}

// Raised by Rocket itself when a form is missing fields it cannot default.
#[catch(422)]
pub fn unprocessable(_: &Request) -> Json<Error> {
    Json(Error {
        message: VALIDATION_MESSAGE.to_string(),
    })
}

#[catch(413)]
pub fn payload_too_large(_: &Request) -> Json<Error> {
    Json(Error {
        message: "Uploaded file is too large.".to_string(),
    })
}
