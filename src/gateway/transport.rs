//! Reqwest-backed transport to the backend API.
//!
//! This adapter owns wire details only: URL joining, bearer headers, form and
//! multipart encoding, and buffering the response body. Status interpretation
//! and JSON decoding happen in the gateway.

use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A file carried through to the backend without being inspected.
#[derive(Clone)]
pub struct FilePart {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(Vec<(&'static str, String)>),
    /// `multipart/form-data` with text fields followed by one file part.
    Multipart {
        fields: Vec<(&'static str, String)>,
        file: FilePart,
    },
}

/// One call to the backend, fully described before it is sent.
#[derive(Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        GatewayRequest {
            method,
            path: path.into(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn form(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn multipart(mut self, fields: Vec<(&'static str, String)>, file: FilePart) -> Self {
        self.body = RequestBody::Multipart { fields, file };
        self
    }

    /// Value of a form or multipart text field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        let fields = match &self.body {
            RequestBody::Empty => return None,
            RequestBody::Form(fields) => fields,
            RequestBody::Multipart { fields, .. } => fields,
        };
        fields.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }
}

/// Status and fully buffered body of a backend answer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: GatewayRequest) -> Result<RawResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport on a client with reqwest's default timeouts.
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: GatewayRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.request(request.method, self.url(&request.path));

        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart { fields, file } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                let part = Part::bytes(file.bytes).file_name(file.file_name).mime_str(&file.content_type)?;
                builder.multipart(form.part(file.field, part))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { status, body })
    }
}
