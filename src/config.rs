use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub view_cache: ViewCacheConfig,
    pub uploads: UploadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the remote API, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    /// Only send the cookie over HTTPS. Off by default for local development.
    pub secure: bool,
    /// Drop the session when the backend rejects its token with 401.
    pub clear_on_unauthorized: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewCacheConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    pub max_file_mebibytes: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            user_agent: concat!("audio-dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_token".to_string(),
            ttl_minutes: 30,
            secure: false,
            clear_on_unauthorized: true,
        }
    }
}

impl Default for ViewCacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 60 }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_file_mebibytes: 5 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Dashboard.toml (base configuration file)
    /// 3. Environment variables prefixed with DASHBOARD_, sections split on `__`
    ///    (e.g. DASHBOARD_BACKEND__BASE_URL)
    /// 4. API_SERVER environment variable (for backwards compatibility)
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        let defaults = toml::to_string(&Config::default()).unwrap_or_default();

        Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("Dashboard.toml"))
            .merge(Env::prefixed("DASHBOARD_").split("__"))
            .merge(Env::raw().only(&["API_SERVER"]).map(|_| "backend.base_url".into()))
    }
}
