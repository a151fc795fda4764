//! Shared test utilities for featkit tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Result};
use featkit::installer::{InstallPlan, InstallStep, Installer};
use featkit::marker::MarkerStore;
use featkit::package::PackageManager;
use featkit::retry::RetryPolicy;
use featkit::verify::Verifier;
use tempfile::TempDir;

/// Temporary state dir, search path and home for one test.
pub struct TestEnv {
    /// Kept alive for the lifetime of TestEnv
    pub _temp_dir: TempDir,
    pub state_dir: PathBuf,
    /// The only directory on the verifier's search path
    pub bin_dir: PathBuf,
    pub home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let state_dir = base.join("state");
        let bin_dir = base.join("bin");
        let home = base.join("home/node");

        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");
        fs::create_dir_all(&home).expect("Failed to create home dir");

        Self {
            _temp_dir: temp_dir,
            state_dir,
            bin_dir,
            home,
        }
    }

    pub fn markers(&self) -> MarkerStore {
        MarkerStore::new(&self.state_dir)
    }

    /// Installer with no retry delay and no registered plans.
    pub fn installer(&self) -> Installer {
        Installer::new(
            self.markers(),
            Verifier::new(self.bin_dir.to_string_lossy()),
            RetryPolicy::new(3, Duration::ZERO),
        )
    }

    /// Path the fallback method installs into.
    pub fn local_bin(&self, binary: &str) -> PathBuf {
        self.home.join(".local/bin").join(binary)
    }

    pub fn plan(&self, component: &str, binary: &str, primary: MockManager, fallback: Option<MockManager>) -> InstallPlan {
        InstallPlan {
            component: component.to_string(),
            binary: binary.to_string(),
            fallback_paths: vec![self.local_bin(binary)],
            primary: InstallStep::new(Box::new(primary), component),
            fallback: fallback.map(|m| InstallStep::new(Box::new(m), component)),
        }
    }
}

/// Create a mock executable file.
pub fn create_mock_binary(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for binary");
    }
    fs::write(path, "#!/bin/sh\necho mock\n").expect("Failed to create mock binary");

    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Scripted package manager. Counts calls through a shared handle.
pub struct MockManager {
    name: String,
    available: bool,
    /// Result per attempt; the last entry repeats.
    results: Vec<bool>,
    /// Made executable whenever an attempt succeeds.
    creates: Option<PathBuf>,
    calls: Rc<Cell<u32>>,
    /// Version argument of every attempt, in order.
    versions: Rc<RefCell<Vec<Option<String>>>>,
}

impl MockManager {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: true,
            results: vec![true],
            creates: None,
            calls: Rc::new(Cell::new(0)),
            versions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn results(mut self, results: &[bool]) -> Self {
        self.results = results.to_vec();
        self
    }

    pub fn always_fails(self) -> Self {
        self.results(&[false])
    }

    pub fn creates(mut self, path: PathBuf) -> Self {
        self.creates = Some(path);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Handle for reading the call count after the mock is boxed.
    pub fn calls(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.calls)
    }

    /// Handle for reading the versions each attempt was asked for.
    pub fn versions(&self) -> Rc<RefCell<Vec<Option<String>>>> {
        Rc::clone(&self.versions)
    }
}

impl PackageManager for MockManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn required_tool(&self) -> &str {
        "mock-tool"
    }

    fn install(&self, package: &str, version: Option<&str>) -> Result<()> {
        let attempt = self.calls.get() + 1;
        self.calls.set(attempt);
        self.versions.borrow_mut().push(version.map(str::to_string));

        let ok = self
            .results
            .get(attempt as usize - 1)
            .or(self.results.last())
            .copied()
            .unwrap_or(true);
        if !ok {
            bail!("'{}' install of {package} failed (exit code 1)", self.name);
        }
        if let Some(path) = &self.creates {
            create_mock_binary(path);
        }
        Ok(())
    }
}

/// Write raw marker content, bypassing the store.
pub fn write_raw_marker(env: &TestEnv, component: &str, content: &str) {
    fs::create_dir_all(&env.state_dir).expect("Failed to create state dir");
    fs::write(env.markers().path(component), content).expect("Failed to write marker");
}
