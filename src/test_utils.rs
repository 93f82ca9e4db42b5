use crate::cache::ViewCache;
use crate::config::{SessionConfig, ViewCacheConfig};
use crate::gateway::{Gateway, GatewayRequest, RawResponse, RequestBody, Transport, TransportError};
use crate::models::audio_file::AudioFile;
use crate::models::session::Session;
use crate::models::user::{NewUser, User};
use crate::service::ActionContext;
use crate::session::{SessionError, SessionStore};
use chrono::{Duration, Utc};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Token the stub backend hands out and accepts.
pub const VALID_TOKEN: &str = "token-abc";

enum Scripted {
    Respond { status: u16, body: String },
    Fail(std::io::ErrorKind),
}

#[derive(Default)]
struct BackendState {
    next_id: u64,
    users: Vec<User>,
    passwords: HashMap<String, String>,
    audio_files: Vec<AudioFile>,
}

/// In-memory stand-in for the backend API. It keeps what it receives, answers
/// in the backend's envelope format, counts calls and can be scripted to
/// return a fixed answer or fail at the transport level.
#[derive(Default)]
pub struct StubBackend {
    calls: AtomicUsize,
    requests: Mutex<Vec<GatewayRequest>>,
    scripted: Mutex<VecDeque<Scripted>>,
    state: Mutex<BackendState>,
    held: Mutex<Option<Hold>>,
}

struct Hold {
    method: &'static str,
    path: String,
    release: Arc<Notify>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer the next call with `status` and `body` instead of simulating it.
    pub fn respond(&self, status: u16, body: impl Into<String>) {
        self.scripted.lock().unwrap().push_back(Scripted::Respond { status, body: body.into() });
    }

    /// Fail the next call as if the connection broke.
    pub fn fail(&self, kind: std::io::ErrorKind) {
        self.scripted.lock().unwrap().push_back(Scripted::Fail(kind));
    }

    /// Hold the answer to the next `method path` call until the returned
    /// handle is notified. The answer is computed before waiting, so it
    /// reflects backend state at the time the call arrived.
    pub fn hold(&self, method: &'static str, path: &str) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.held.lock().unwrap() = Some(Hold {
            method,
            path: path.to_string(),
            release: release.clone(),
        });
        release
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GatewayRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn seed_user(&self, new_user: &NewUser) -> String {
        let mut state = self.state.lock().unwrap();
        insert_user(&mut state, new_user)
    }

    pub fn seed_audio_file(&self, description: &str, category: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("audio-{}", state.next_id);
        state.audio_files.push(AudioFile {
            id: id.clone(),
            description: description.to_string(),
            category: category.to_string(),
        });
        id
    }

    fn simulate(&self, request: &GatewayRequest) -> (u16, serde_json::Value) {
        let mut state = self.state.lock().unwrap();
        let segments: Vec<String> = request
            .path
            .trim_matches('/')
            .split('/')
            .map(|segment| urlencoding::decode(segment).map(|s| s.into_owned()).unwrap_or_default())
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let authenticated = request.bearer.as_deref() == Some(VALID_TOKEN);

        match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["token"]) => {
                let username = request.field("username").unwrap_or_default();
                let password = request.field("password").unwrap_or_default();
                if state.passwords.get(username).is_some_and(|stored| stored == password) {
                    (200, json!({ "access_token": VALID_TOKEN, "token_type": "bearer" }))
                } else {
                    (401, json!({ "detail": "Incorrect username or password" }))
                }
            }
            ("POST", ["users"]) => {
                let new_user = NewUser {
                    username: request.field("username").unwrap_or_default().to_string(),
                    full_name: request.field("full_name").unwrap_or_default().to_string(),
                    email: request.field("email").unwrap_or_default().to_string(),
                    password: request.field("password").unwrap_or_default().to_string(),
                };
                if [&new_user.username, &new_user.full_name, &new_user.email, &new_user.password].iter().any(|value| value.is_empty()) {
                    return (422, json!({ "detail": [{ "loc": ["body"], "msg": "field required" }] }));
                }
                if state.users.iter().any(|user| user.username == new_user.username || user.email == new_user.email) {
                    return (400, json!({ "detail": "Email or username already exists!" }));
                }
                insert_user(&mut state, &new_user);
                (201, json!({ "detail": "" }))
            }
            _ if !authenticated => (401, json!({ "detail": "Could not validate credentials" })),
            ("GET", ["users"]) => (200, json!({ "objs": encode_all(&state.users) })),
            ("GET", ["users", id]) => match state.users.iter().find(|user| user.id == *id) {
                Some(user) => (200, json!({ "obj": encode(user) })),
                None => not_found(id),
            },
            ("PUT", ["users", id]) => match state.users.iter_mut().find(|user| user.id == *id) {
                Some(user) => {
                    user.username = request.field("username").unwrap_or_default().to_string();
                    user.full_name = request.field("full_name").unwrap_or_default().to_string();
                    user.email = request.field("email").unwrap_or_default().to_string();
                    (202, json!({ "obj": encode(user) }))
                }
                None => not_found(id),
            },
            ("DELETE", ["users", id]) => {
                let before = state.users.len();
                state.users.retain(|user| user.id != *id);
                if state.users.len() == before { not_found(id) } else { (202, json!({})) }
            }
            ("GET", ["audio_files"]) => (200, json!({ "objs": encode_all(&state.audio_files) })),
            ("POST", ["audio_files"]) => {
                let description = request.field("description").unwrap_or_default().to_string();
                let category = request.field("category").unwrap_or_default().to_string();
                let has_file = matches!(&request.body, RequestBody::Multipart { file, .. } if !file.bytes.is_empty());
                if description.is_empty() || category.is_empty() || !has_file {
                    return (422, json!({ "detail": [{ "loc": ["body"], "msg": "field required" }] }));
                }
                state.next_id += 1;
                let file = AudioFile {
                    id: format!("audio-{}", state.next_id),
                    description,
                    category,
                };
                let body = json!({ "obj": encode(&file) });
                state.audio_files.push(file);
                (201, body)
            }
            ("GET", ["audio_files", "token", id]) => {
                if state.audio_files.iter().any(|file| file.id == *id) {
                    (200, json!({ "audio_url": format!("https://blob.example/audio/{id}?sig=stub") }))
                } else {
                    not_found(id)
                }
            }
            _ => (404, json!({ "detail": "Not Found" })),
        }
    }
}

#[async_trait::async_trait]
impl Transport for StubBackend {
    async fn send(&self, request: GatewayRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let scripted = self.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Fail(kind)) => Err(TransportError::Io(std::io::Error::new(kind, "stub transport failure"))),
            Some(Scripted::Respond { status, body }) => Ok(RawResponse {
                status,
                body: body.into_bytes(),
            }),
            None => {
                let (status, body) = self.simulate(&request);
                let held = {
                    let mut held = self.held.lock().unwrap();
                    let matches = held.as_ref().is_some_and(|hold| hold.method == request.method.as_str() && hold.path == request.path);
                    if matches { held.take() } else { None }
                };
                if let Some(hold) = held {
                    hold.release.notified().await;
                }
                Ok(RawResponse {
                    status,
                    body: body.to_string().into_bytes(),
                })
            }
        }
    }
}

fn insert_user(state: &mut BackendState, new_user: &NewUser) -> String {
    state.next_id += 1;
    let id = format!("user-{}", state.next_id);
    state.users.push(User {
        id: id.clone(),
        username: new_user.username.clone(),
        email: new_user.email.clone(),
        full_name: new_user.full_name.clone(),
        disabled: false,
    });
    state.passwords.insert(new_user.username.clone(), new_user.password.clone());
    id
}

fn encode<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap()
}

fn encode_all<T: serde::Serialize>(values: &[T]) -> Vec<String> {
    values.iter().map(encode).collect()
}

fn not_found(id: &str) -> (u16, serde_json::Value) {
    (404, json!({ "detail": format!("No objects with {id} found") }))
}

/// Session store kept in memory, optionally refusing writes.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
    fail_writes: bool,
}

impl MemorySessionStore {
    pub fn holding(session: Session) -> Self {
        MemorySessionStore {
            slot: Mutex::new(Some(session)),
            fail_writes: false,
        }
    }

    pub fn failing_writes() -> Self {
        MemorySessionStore {
            slot: Mutex::new(None),
            fail_writes: true,
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, token: &str, ttl: Duration) -> Result<Session, SessionError> {
        if self.fail_writes {
            return Err(SessionError::Storage("writes disabled".to_string()));
        }
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or(SessionError::InvalidExpiry(ttl))?;
        let session = Session {
            token: token.to_string(),
            expires_at: Some(expires_at),
        };
        *self.slot.lock().map_err(|e| SessionError::Storage(e.to_string()))? = Some(session.clone());
        Ok(session)
    }

    fn read(&self) -> Option<Session> {
        let mut slot = self.slot.lock().ok()?;
        if slot.as_ref().is_some_and(|session| session.is_expired(Utc::now())) {
            *slot = None;
        }
        slot.clone()
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.lock().map_err(|e| SessionError::Storage(e.to_string()))? = None;
        Ok(())
    }
}

/// Everything an action needs, wired to the stub backend.
pub struct Harness {
    pub stub: Arc<StubBackend>,
    pub gateway: Gateway,
    pub sessions: MemorySessionStore,
    pub views: ViewCache,
    pub settings: SessionConfig,
}

impl Harness {
    fn with_sessions(sessions: MemorySessionStore) -> Self {
        let stub = StubBackend::new();
        Harness {
            gateway: Gateway::new(stub.clone()),
            stub,
            sessions,
            views: ViewCache::new(&ViewCacheConfig::default()),
            settings: SessionConfig::default(),
        }
    }

    pub fn anonymous() -> Self {
        Self::with_sessions(MemorySessionStore::default())
    }

    pub fn signed_in() -> Self {
        Self::signed_in_as(VALID_TOKEN)
    }

    pub fn signed_in_as(token: &str) -> Self {
        Self::with_sessions(MemorySessionStore::holding(Session {
            token: token.to_string(),
            expires_at: Some(Utc::now() + Duration::minutes(30)),
        }))
    }

    pub fn expired() -> Self {
        Self::with_sessions(MemorySessionStore::holding(Session {
            token: VALID_TOKEN.to_string(),
            expires_at: Some(Utc::now() - Duration::seconds(1)),
        }))
    }

    pub fn with_failing_session_writes() -> Self {
        Self::with_sessions(MemorySessionStore::failing_writes())
    }

    pub fn ctx(&self) -> ActionContext<'_> {
        ActionContext {
            gateway: &self.gateway,
            sessions: &self.sessions,
            views: &self.views,
            settings: &self.settings,
        }
    }
}
