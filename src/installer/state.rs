//! Installer states, used to log every transition of a run.
//!
//! ```text
//! START → [marker?] → VERIFY → DONE(cached)
//!                            ↘ ATTEMPT_PRIMARY → VERIFY → WRITE_MARKER → DONE(primary)
//!                                              ↘ ATTEMPT_FALLBACK → VERIFY → WRITE_MARKER → DONE(fallback)
//!                                                                 ↘ FAILED
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Cached,
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Start,
    Verify,
    AttemptPrimary,
    AttemptFallback,
    WriteMarker,
    Done(Route),
    Failed,
}

impl InstallState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed)
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::Verify => write!(f, "VERIFY"),
            Self::AttemptPrimary => write!(f, "ATTEMPT_PRIMARY"),
            Self::AttemptFallback => write!(f, "ATTEMPT_FALLBACK"),
            Self::WriteMarker => write!(f, "WRITE_MARKER"),
            Self::Done(Route::Cached) => write!(f, "DONE(cached)"),
            Self::Done(Route::Primary) => write!(f, "DONE(primary)"),
            Self::Done(Route::Fallback) => write!(f, "DONE(fallback)"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}
