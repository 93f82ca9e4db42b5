pub mod audio_file;
pub mod auth;
pub mod session;
pub mod user;
