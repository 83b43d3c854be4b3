//! Alias table resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Hard bound on alias recursion depth. Alias chains are resolved one
/// path segment at a time; the bound keeps a pathological table from
/// recursing without limit.
const MAX_ALIAS_DEPTH: usize = 32;

/// Resolve a package-style name through the alias table.
///
/// An exact table hit wins and is joined onto `root`. Otherwise the name
/// is split on `/` and the prefix resolved recursively, so a single alias
/// entry covers a whole subtree (`util` -> `styles` makes `util/index`
/// resolve under `styles/`). `None` means no alias applies and the caller
/// falls back to the raw name.
#[must_use]
pub fn resolve_alias(alias: &BTreeMap<String, String>, root: &Path, name: &str) -> Option<PathBuf> {
    resolve_at(alias, root, name, MAX_ALIAS_DEPTH)
}

fn resolve_at(
    alias: &BTreeMap<String, String>,
    root: &Path,
    name: &str,
    depth: usize,
) -> Option<PathBuf> {
    if depth == 0 {
        return None;
    }
    if let Some(target) = alias.get(name) {
        return Some(root.join(target));
    }
    let (prefix, last) = name.rsplit_once('/')?;
    let parent = resolve_at(alias, root, prefix, depth - 1)?;
    Some(parent.join(last))
}
