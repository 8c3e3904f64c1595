// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling the fixed watch registrations into glob profiles.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does not run pipelines itself; it only turns filesystem changes
//! into runtime triggers.

pub mod patterns;
pub mod watcher;

pub use patterns::{WatchProfile, WatchTarget, build_watch_profiles};
pub use watcher::{WatcherHandle, spawn_watcher};
