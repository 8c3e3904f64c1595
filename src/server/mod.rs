// src/server/mod.rs

//! Live-reload server: a static file server rooted at the build
//! directory plus a notification channel browsers subscribe to.

pub mod reload;
pub mod static_files;

pub use reload::ReloadHub;
pub use static_files::{EVENTS_PATH, ServerHandle, spawn_server};
