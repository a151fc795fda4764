//! Status and reset commands - inspect and clear install markers.

use anyhow::Result;

use crate::component::{self, ALL_COMPONENTS};
use crate::config::Config;
use crate::marker::MarkerStore;
use crate::platform::PlatformInfo;
use crate::verify::{default_fallback_paths, Verifier};

/// Execute the status command.
///
/// Without `all`, lists existing markers (optionally just one component).
/// With `all`, lists every known component and whether it verifies.
pub fn cmd_status(
    config: &Config,
    platform: &PlatformInfo,
    component: Option<&str>,
    all: bool,
) -> Result<()> {
    let store = MarkerStore::new(&config.state_dir);

    if all {
        let verifier = Verifier::new(config.search_path.clone());
        for def in ALL_COMPONENTS {
            let marker = store
                .read(def.name)
                .map_or_else(|| "no marker".to_string(), |r| format!("marker: {}", r.method));
            let found = verifier.locate(def.binary, &default_fallback_paths(&platform.home, def.binary));
            let state = match found {
                Some(path) => format!("runnable at {}", path.display()),
                None => "not found".to_string(),
            };
            println!("  {:<28} {:<24} {state}", def.name, marker);
            println!("  {:<28} {}", "", def.description);
        }
        return Ok(());
    }

    if let Some(name) = component {
        component::validate_name(name)?;
        if component::find(name).is_none() {
            tracing::warn!("'{name}' is not in the component catalog");
        }
        match store.read(name) {
            Some(record) => println!("{record}"),
            None => println!("{name}: not installed"),
        }
        return Ok(());
    }

    let records = store.list();
    if records.is_empty() {
        println!("No components installed (state dir {})", store.dir().display());
    }
    for record in records {
        println!("{record}");
    }
    Ok(())
}

/// Execute the reset command: remove a marker so the next install re-verifies.
pub fn cmd_reset(config: &Config, component: &str) -> Result<()> {
    component::validate_name(component)?;
    let store = MarkerStore::new(&config.state_dir);
    if store.remove(component)? {
        println!("{component}: marker removed");
    } else {
        println!("{component}: no marker");
    }
    Ok(())
}
