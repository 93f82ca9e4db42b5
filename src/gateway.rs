pub mod envelope;
pub mod transport;

use crate::config::BackendConfig;
use crate::error::action_error::{ActionError, GatewayResult};
use envelope::{ObjEnvelope, ObjsEnvelope};
use rocket::fairing::AdHoc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
pub use transport::{FilePart, GatewayRequest, RawResponse, ReqwestTransport, RequestBody, Transport, TransportError};

/// Single chokepoint for calls to the backend API.
///
/// Each call is sent exactly once. Whatever happens on the way (connection
/// faults, unreadable bodies, error statuses) comes back as an [`ActionError`]
/// whose message is safe to show; `fallback` is the resource-specific text used
/// when the cause must stay in the logs.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Gateway { transport }
    }

    /// Send `request` and decode a 2xx body as `T`.
    pub async fn call<T: DeserializeOwned>(&self, request: GatewayRequest, fallback: &'static str) -> GatewayResult<T> {
        let method = request.method.clone();
        let path = request.path.clone();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(method = %method, path = %path, error = %err, "backend call failed");
                return Err(ActionError::transport(fallback));
            }
        };

        let body: Value = match serde_json::from_slice(&response.body) {
            Ok(body) => body,
            Err(err) => {
                error!(method = %method, path = %path, status = response.status, error = %err, "backend answered with malformed JSON");
                return Err(ActionError::transport(fallback));
            }
        };

        if !(200..300).contains(&response.status) {
            let failure = failure_from(response.status, &body, fallback);
            warn!(method = %method, path = %path, status = response.status, "backend rejected call");
            return Err(failure);
        }

        debug!(method = %method, path = %path, status = response.status, "backend call succeeded");
        serde_json::from_value(body).map_err(|err| {
            error!(method = %method, path = %path, error = %err, "unexpected backend response shape");
            ActionError::transport(fallback)
        })
    }

    /// Call an endpoint answering `{ "obj": "<json>" }`.
    pub async fn call_obj<T: DeserializeOwned>(&self, request: GatewayRequest, fallback: &'static str) -> GatewayResult<T> {
        let path = request.path.clone();
        let envelope: ObjEnvelope = self.call(request, fallback).await?;
        envelope.decode().map_err(|err| {
            error!(path = %path, error = %err, "backend object is not valid JSON");
            ActionError::transport(fallback)
        })
    }

    /// Call an endpoint answering `{ "objs": ["<json>", ...] }`.
    pub async fn call_objs<T: DeserializeOwned>(&self, request: GatewayRequest, fallback: &'static str) -> GatewayResult<Vec<T>> {
        let path = request.path.clone();
        let envelope: ObjsEnvelope = self.call(request, fallback).await?;
        envelope.decode().map_err(|err| {
            error!(path = %path, error = %err, "backend list element is not valid JSON");
            ActionError::transport(fallback)
        })
    }
}

/// Build the HTTP client at ignite and manage a [`Gateway`] over it.
pub fn stage_gateway(backend: BackendConfig) -> AdHoc {
    AdHoc::try_on_ignite("Backend gateway (reqwest)", |rocket| async move {
        match ReqwestTransport::new(&backend) {
            Ok(transport) => {
                info!(base_url = %backend.base_url, "backend gateway initialized");
                Ok(rocket.manage(Gateway::new(Arc::new(transport))))
            }
            Err(e) => {
                error!("Failed to build backend HTTP client: {}", e);
                Err(rocket)
            }
        }
    })
}

/// Percent-encode a value used as a single path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn failure_from(status: u16, body: &Value, fallback: &'static str) -> ActionError {
    if status == 422 {
        return ActionError::Validation;
    }

    match body.get("detail") {
        Some(Value::String(detail)) => ActionError::backend(status, detail.clone()),
        Some(detail) if !detail.is_null() => ActionError::backend(status, detail.to_string()),
        _ => ActionError::backend(status, fallback),
    }
}
