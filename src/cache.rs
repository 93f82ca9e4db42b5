use crate::config::ViewCacheConfig;
use crate::models::session::Session;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Collections whose list views are cached and invalidated after mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    AudioFiles,
}

impl Collection {
    /// Path of the list view the collection is rendered on.
    pub fn view_path(self) -> &'static str {
        match self {
            Collection::Users => "/dashboard/users",
            Collection::AudioFiles => "/dashboard/audio_files",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ViewKey {
    collection: Collection,
    session: String,
}

#[derive(Debug)]
struct CachedView {
    stored_at: Instant,
    value: Value,
}

/// Per-session cache of rendered list views.
///
/// Entries are keyed by a fingerprint of the session token so the cache never
/// holds raw tokens and two sessions never share a view. Each collection
/// carries a generation that `invalidate` bumps; a view fetched under an older
/// generation is never stored.
#[derive(Debug)]
pub struct ViewCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ViewKey, CachedView>,
    generations: HashMap<Collection, u64>,
}

impl CacheState {
    fn generation(&self, collection: Collection) -> u64 {
        self.generations.get(&collection).copied().unwrap_or_default()
    }
}

impl ViewCache {
    pub fn new(config: &ViewCacheConfig) -> Self {
        ViewCache {
            ttl: Duration::from_secs(config.ttl_seconds),
            state: RwLock::new(CacheState::default()),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, collection: Collection, session: &Session) -> Option<T> {
        let key = view_key(collection, session);
        let state = self.state.read().await;
        let cached = state.entries.get(&key)?;
        if cached.stored_at.elapsed() >= self.ttl {
            return None;
        }

        match serde_json::from_value(cached.value.clone()) {
            Ok(value) => {
                debug!(view = collection.view_path(), "view cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(view = collection.view_path(), error = %err, "cached view no longer decodes");
                None
            }
        }
    }

    /// Current generation of `collection`. Read it before fetching a view and
    /// hand it back to [`ViewCache::put`].
    pub async fn generation(&self, collection: Collection) -> u64 {
        self.state.read().await.generation(collection)
    }

    /// Store a view fetched under `generation`. Dropped when the collection was
    /// invalidated since, so a mutation that finished mid-fetch is never hidden.
    pub async fn put<T: Serialize>(&self, collection: Collection, session: &Session, generation: u64, value: &T) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!(view = collection.view_path(), error = %err, "view not cacheable");
                return false;
            }
        };

        let mut state = self.state.write().await;
        if state.generation(collection) != generation {
            debug!(view = collection.view_path(), "view fetched before an invalidation, not cached");
            return false;
        }

        let ttl = self.ttl;
        state.entries.retain(|_, cached| cached.stored_at.elapsed() < ttl);
        state.entries.insert(
            view_key(collection, session),
            CachedView {
                stored_at: Instant::now(),
                value,
            },
        );
        true
    }

    /// Mark every cached view of `collection` stale, for all sessions.
    /// Other collections are left untouched. Returns the number of dropped views.
    pub async fn invalidate(&self, collection: Collection) -> usize {
        let mut state = self.state.write().await;
        *state.generations.entry(collection).or_default() += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| key.collection != collection);
        let dropped = before - state.entries.len();

        debug!(view = collection.view_path(), dropped, "view invalidated");
        dropped
    }

    pub async fn is_cached(&self, collection: Collection, session: &Session) -> bool {
        let state = self.state.read().await;
        state
            .entries
            .get(&view_key(collection, session))
            .is_some_and(|cached| cached.stored_at.elapsed() < self.ttl)
    }
}

fn view_key(collection: Collection, session: &Session) -> ViewKey {
    ViewKey {
        collection,
        session: hex::encode(Sha256::digest(session.token.as_bytes())),
    }
}
