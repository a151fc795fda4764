//! Shared filesystem utilities.

pub mod files;

pub use files::{atomic_write, chown_best_effort, is_executable};
