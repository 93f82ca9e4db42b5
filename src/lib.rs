mod auth;
mod cache;
mod config;
mod error;
mod gateway;
mod middleware;
mod models;
mod routes;
mod service;
mod session;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::cache::ViewCache;
use crate::gateway::stage_gateway;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::data::{Limits, ToByteUnit};
use rocket::{Build, Rocket, catchers};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=audio_dashboard::gateway=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed (tests build several rockets).
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

fn upload_limits(uploads: &config::UploadConfig) -> Limits {
    let file_limit = uploads.max_file_mebibytes.mebibytes();
    Limits::default()
        .limit("file", file_limit)
        // Room for the description and category fields next to the file.
        .limit("data-form", file_limit + 1u64.mebibytes())
}

/// Everything except the backend gateway, which the caller provides.
fn base_rocket(config: Config) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()))
        .merge(("limits", upload_limits(&config.uploads)));

    rocket::custom(figment)
        .manage(ViewCache::new(&config.view_cache))
        .manage(config)
        .attach(RequestLogger)
        .mount("/", app_routes::auth::routes())
        .mount("/health", app_routes::health::routes())
        .mount("/dashboard", app_routes::dashboard::routes())
        .mount("/dashboard/users", app_routes::user::routes())
        .mount("/dashboard/audio_files", app_routes::audio_file::routes())
        .register(
            "/",
            catchers![app_routes::error::not_found, app_routes::error::unprocessable, app_routes::error::payload_too_large],
        )
        .register("/dashboard", catchers![auth::unauthorized])
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let backend = config.backend.clone();
    base_rocket(config).attach(stage_gateway(backend))
}

/// Same application wired to an arbitrary transport instead of reqwest.
#[cfg(test)]
pub(crate) fn build_rocket_with(config: Config, transport: std::sync::Arc<dyn gateway::Transport>) -> Rocket<Build> {
    base_rocket(config).manage(gateway::Gateway::new(transport))
}
