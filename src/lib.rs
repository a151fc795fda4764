//! featkit library exports.
//!
//! The binary is a thin clap front end over these modules; integration
//! tests under `tests/` drive them directly.

pub mod commands;
pub mod common;
pub mod component;
pub mod config;
pub mod error;
pub mod hooks;
pub mod installer;
pub mod marker;
pub mod package;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod retry;
pub mod settings;
pub mod timing;
pub mod verify;

pub use error::{InstallError, SettingsError};
pub use installer::{InstallOutcome, Installer};
