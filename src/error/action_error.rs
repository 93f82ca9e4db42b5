use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use serde::Serialize;
use rocket::{Request, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::warn;

pub const VALIDATION_MESSAGE: &str = "Validation Error: Please check for incorrect or blank fields.";

/// Every way a resource action can fail, already reduced to what the user is
/// allowed to see. Raw causes are logged where they happen, never carried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The backend could not be reached or answered with something unreadable.
    #[error("{message}")]
    Transport { message: &'static str },
    /// The backend rejected the submitted fields (HTTP 422).
    #[error("Validation Error: Please check for incorrect or blank fields.")]
    Validation,
    /// Any other non-2xx answer, carrying the backend's `detail` verbatim.
    #[error("{detail}")]
    Backend { status: u16, detail: String },
    #[error("{message}")]
    Session { message: &'static str },
}

pub type GatewayResult<T> = Result<T, ActionError>;

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ActionError {
    pub fn transport(message: &'static str) -> Self {
        Self::Transport { message }
    }

    pub fn session(message: &'static str) -> Self {
        Self::Session { message }
    }

    pub fn backend(status: u16, detail: impl Into<String>) -> Self {
        Self::Backend {
            status,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ActionError::Transport { .. } => 502,
            ActionError::Validation => 422,
            ActionError::Backend { status, .. } => *status,
            ActionError::Session { .. } => 500,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    fn kind(&self) -> &'static str {
        match self {
            ActionError::Transport { .. } => "transport",
            ActionError::Validation => "validation",
            ActionError::Backend { .. } => "backend",
            ActionError::Session { .. } => "session",
        }
    }
}

impl From<&ActionError> for Status {
    fn from(e: &ActionError) -> Self {
        // Backend statuses outside the valid range still have to go out as an error.
        match Status::from_code(e.status()) {
            Some(status) if status.class().is_client_error() || status.class().is_server_error() => status,
            _ => Status::BadGateway,
        }
    }
}

impl<'r> Responder<'r, 'static> for ActionError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let status = Status::from(&self);

        warn!(
            method = %req.method(),
            uri = %req.uri(),
            status = status.code,
            kind = self.kind(),
            "action failed"
        );

        let body = serde_json::to_string(&ErrorBody { message: self.message() }).map_err(|_| Status::InternalServerError)?;

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
