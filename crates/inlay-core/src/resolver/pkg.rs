//! Package descriptor reading and entry-file selection.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default stylesheet entry within a package directory.
pub const DEFAULT_ENTRY: &str = "index.css";

/// Subset of `package.json` the resolver consults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    /// Declared stylesheet entry.
    #[serde(default)]
    pub style: Option<String>,
    /// Entry file actually used; overwritten by [`apply_entry`].
    #[serde(default)]
    pub main: Option<String>,
}

/// Read `package.json` from a directory. Unreadable or invalid
/// descriptors are treated as absent and the lookup walk falls back to
/// index probing.
#[must_use]
pub fn read_descriptor(dir: &Path) -> Option<PackageDescriptor> {
    let text = std::fs::read_to_string(dir.join("package.json")).ok()?;
    serde_json::from_str(&text).ok()
}

/// Entry-selection hook, applied once per candidate package directory:
/// shim override by package name, then the declared `style` field, then
/// [`DEFAULT_ENTRY`]. Overwrites the descriptor's `main` in place.
pub fn apply_entry(shim: &BTreeMap<String, String>, pkg: &mut PackageDescriptor) {
    let shimmed = pkg.name.as_ref().and_then(|name| shim.get(name)).cloned();
    pkg.main = Some(
        shimmed
            .or_else(|| pkg.style.clone())
            .unwrap_or_else(|| DEFAULT_ENTRY.to_string()),
    );
}
