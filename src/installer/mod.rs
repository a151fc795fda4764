//! Idempotent installation with verified fallback.
//!
//! [`Installer::ensure_installed`] is a no-op when a marker exists and the
//! tool still verifies. Otherwise it runs the primary method (with bounded
//! retry), verifies, falls back if needed, and only writes a marker for a
//! state that verification confirmed.

mod state;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub use state::{InstallState, Route};

use crate::component::{self, ALL_COMPONENTS};
use crate::config::Config;
use crate::error::InstallError;
use crate::marker::{InstallRecord, MarkerStore};
use crate::package::{InstallContext, PackageManager};
use crate::platform::PlatformInfo;
use crate::retry::RetryPolicy;
use crate::verify::Verifier;

/// Whether a method is the preferred one or the backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodRole {
    Primary,
    Fallback,
}

/// Marker label for a method: `native binary`, `npm fallback`, ...
pub fn method_label(role: MethodRole, manager: &str) -> String {
    match role {
        MethodRole::Primary => manager.to_string(),
        MethodRole::Fallback => format!("{manager} fallback"),
    }
}

/// A package manager paired with the package to ask it for.
pub struct InstallStep {
    pub manager: Box<dyn PackageManager>,
    pub package: String,
}

impl InstallStep {
    pub fn new(manager: Box<dyn PackageManager>, package: impl Into<String>) -> Self {
        Self {
            manager,
            package: package.into(),
        }
    }
}

impl fmt::Debug for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallStep")
            .field("manager", &self.manager.name())
            .field("package", &self.package)
            .finish()
    }
}

/// Everything needed to install and verify one component.
#[derive(Debug)]
pub struct InstallPlan {
    pub component: String,
    pub binary: String,
    /// Checked after the search path during verification.
    pub fallback_paths: Vec<PathBuf>,
    pub primary: InstallStep,
    pub fallback: Option<InstallStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Marker present and the tool still verifies; nothing was run.
    AlreadyInstalled { record: InstallRecord, path: PathBuf },
    /// Freshly installed and verified; `record` is the marker just written.
    Installed { record: InstallRecord, path: PathBuf },
}

impl InstallOutcome {
    pub fn record(&self) -> &InstallRecord {
        match self {
            Self::AlreadyInstalled { record, .. } | Self::Installed { record, .. } => record,
        }
    }

    pub fn method(&self) -> &str {
        &self.record().method
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::AlreadyInstalled { path, .. } | Self::Installed { path, .. } => path,
        }
    }

    pub fn was_cached(&self) -> bool {
        matches!(self, Self::AlreadyInstalled { .. })
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled { record, path } => write!(
                f,
                "{} already installed ({}) at {}",
                record.component,
                record.method,
                path.display()
            ),
            Self::Installed { record, path } => write!(
                f,
                "{} installed via {} at {}",
                record.component,
                record.method,
                path.display()
            ),
        }
    }
}

pub struct Installer {
    markers: MarkerStore,
    verifier: Verifier,
    retry: RetryPolicy,
    /// uid/gid the marker file is handed to.
    owner: Option<(u32, u32)>,
    plans: BTreeMap<String, InstallPlan>,
}

impl Installer {
    pub fn new(markers: MarkerStore, verifier: Verifier, retry: RetryPolicy) -> Self {
        Self {
            markers,
            verifier,
            retry,
            owner: None,
            plans: BTreeMap::new(),
        }
    }

    /// Installer with every catalog component registered.
    pub fn from_config(config: &Config, platform: &PlatformInfo) -> Self {
        let ctx = InstallContext::new(config.search_path.clone(), platform);
        let mut installer = Self::new(
            MarkerStore::new(&config.state_dir),
            Verifier::new(config.search_path.clone()),
            config.retry,
        );
        if !platform.is_root() {
            installer = installer.with_owner(platform.uid, platform.gid);
        }

        for component in ALL_COMPONENTS {
            installer.register(component.plan(&ctx));
        }
        installer
    }

    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.owner = Some((uid, gid));
        self
    }

    /// Register (or replace) the plan for a component.
    pub fn register(&mut self, plan: InstallPlan) {
        self.plans.insert(plan.component.clone(), plan);
    }

    /// Ensure `component` is installed and verified, latest release.
    pub fn ensure_installed(&self, component: &str) -> Result<InstallOutcome, InstallError> {
        self.ensure_version(component, None)
    }

    /// Like [`Installer::ensure_installed`], pinning `version` for this
    /// component only. The pin reaches the fallback method too.
    pub fn ensure_version(
        &self,
        component: &str,
        version: Option<&str>,
    ) -> Result<InstallOutcome, InstallError> {
        component::validate_name(component)?;
        let plan = self
            .plans
            .get(component)
            .ok_or_else(|| InstallError::UnknownComponent(component.to_string()))?;
        self.run_plan(plan, version)
    }

    /// Run the install state machine for `plan`.
    pub fn run_plan(
        &self,
        plan: &InstallPlan,
        version: Option<&str>,
    ) -> Result<InstallOutcome, InstallError> {
        let name = plan.component.as_str();
        component::validate_name(name)?;
        self.transition(name, InstallState::Start);

        match self.markers.read(name) {
            Some(record) => {
                self.transition(name, InstallState::Verify);
                if let Some(path) = self.verifier.locate(&plan.binary, &plan.fallback_paths) {
                    self.transition(name, InstallState::Done(Route::Cached));
                    tracing::info!(
                        "{name} already installed ({}, {}), skipping",
                        record.method,
                        path.display()
                    );
                    return Ok(InstallOutcome::AlreadyInstalled { record, path });
                }
                tracing::warn!(
                    "{name}: marker says '{}' but '{}' is not runnable; reinstalling",
                    record.method,
                    plan.binary
                );
                self.markers.remove(name)?;
            }
            None => {
                // Clears a corrupt marker left by an interrupted run, if any.
                self.markers.remove(name)?;
            }
        }

        let primary_label = method_label(MethodRole::Primary, plan.primary.manager.name());
        let primary_reason = match self.attempt(plan, &plan.primary, MethodRole::Primary, version) {
            Ok(path) => return self.finish(plan, primary_label, path, Route::Primary),
            Err(reason) => reason,
        };

        let Some(fallback) = &plan.fallback else {
            self.transition(name, InstallState::Failed);
            let err = InstallError::PrimaryFailed {
                component: name.to_string(),
                method: primary_label,
                reason: primary_reason,
            };
            tracing::error!("{err}");
            return Err(err);
        };

        tracing::warn!("{name}: {primary_label} did not produce a working install, falling back");
        let fallback_label = method_label(MethodRole::Fallback, fallback.manager.name());
        match self.attempt(plan, fallback, MethodRole::Fallback, version) {
            Ok(path) => self.finish(plan, fallback_label, path, Route::Fallback),
            Err(fallback_reason) => {
                self.transition(name, InstallState::Failed);
                let err = InstallError::BothMethodsFailed {
                    component: name.to_string(),
                    primary: primary_label,
                    primary_reason,
                    fallback: fallback_label,
                    fallback_reason,
                };
                tracing::error!("{err}");
                Err(err)
            }
        }
    }

    /// Run one method with retry, then verify. Returns the located binary or
    /// the reason the method did not work.
    fn attempt(
        &self,
        plan: &InstallPlan,
        step: &InstallStep,
        role: MethodRole,
        version: Option<&str>,
    ) -> Result<PathBuf, String> {
        let name = plan.component.as_str();
        let label = method_label(role, step.manager.name());
        self.transition(
            name,
            match role {
                MethodRole::Primary => InstallState::AttemptPrimary,
                MethodRole::Fallback => InstallState::AttemptFallback,
            },
        );

        if !step.manager.is_available() {
            let err = InstallError::MissingTool {
                tool: step.manager.required_tool().to_string(),
                method: label,
            };
            tracing::error!("{name}: {err}");
            return Err(err.to_string());
        }

        let outcome = self
            .retry
            .run(&format!("{name} via {label}"), |_| {
                step.manager.install(&step.package, version)
            });
        if let Err(e) = outcome.result {
            return Err(format!("{e:#} (after {} attempts)", outcome.tries));
        }

        self.transition(name, InstallState::Verify);
        match self.verifier.locate(&plan.binary, &plan.fallback_paths) {
            Some(path) => Ok(path),
            None => {
                tracing::warn!(
                    "{name}: {label} reported success but '{}' was not found",
                    plan.binary
                );
                Err(format!(
                    "'{}' not found on the search path or fallback paths after install",
                    plan.binary
                ))
            }
        }
    }

    fn finish(
        &self,
        plan: &InstallPlan,
        method: String,
        path: PathBuf,
        route: Route,
    ) -> Result<InstallOutcome, InstallError> {
        let name = plan.component.as_str();
        self.transition(name, InstallState::WriteMarker);
        let record = InstallRecord::new(name, method);
        self.markers.write(&record, self.owner)?;
        self.transition(name, InstallState::Done(route));
        tracing::info!("{name} installed via {} ({})", record.method, path.display());
        Ok(InstallOutcome::Installed { record, path })
    }

    fn transition(&self, component: &str, state: InstallState) {
        if state.is_terminal() {
            tracing::info!("{component}: {state}");
        } else {
            tracing::debug!("{component}: {state}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label() {
        assert_eq!(method_label(MethodRole::Primary, "native binary"), "native binary");
        assert_eq!(method_label(MethodRole::Fallback, "npm"), "npm fallback");
    }
}
