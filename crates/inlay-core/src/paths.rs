//! Path helpers: lexical normalization and relative labeling.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: collapse `.` and `..` components without
/// touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Compute `target` relative to `base`. Falls back to `target` itself when
/// the two share no common prefix (different drives, mixed absolute and
/// relative inputs).
#[must_use]
pub fn relative_from(base: &Path, target: &Path) -> PathBuf {
    let base_comps: Vec<Component<'_>> = base.components().collect();
    let target_comps: Vec<Component<'_>> = target.components().collect();

    let common = base_comps
        .iter()
        .zip(&target_comps)
        .take_while(|(a, b)| *a == *b)
        .count();
    if common == 0 {
        return target.to_path_buf();
    }

    let mut out = PathBuf::new();
    for _ in common..base_comps.len() {
        out.push("..");
    }
    for comp in &target_comps[common..] {
        out.push(comp);
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Relative label for source mappings, with forward slashes on every
/// platform.
#[must_use]
pub fn relative_label(base: &Path, target: &Path) -> String {
    relative_from(base, target)
        .to_string_lossy()
        .replace('\\', "/")
}
