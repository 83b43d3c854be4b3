//! The resolution walk: classify a target, then locate the stylesheet
//! file the way Node locates modules, restricted to stylesheet
//! extensions.

use super::alias::resolve_alias;
use super::pkg::{apply_entry, read_descriptor, DEFAULT_ENTRY};
use crate::error::Error;
use crate::paths::normalize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extensions probed for stylesheet files.
pub const STYLE_EXTENSIONS: &[&str] = &[".css"];

/// Maximum number of tried paths to record on failure.
const MAX_TRIED_PATHS: usize = 20;

/// Configuration for one resolution pass; borrowed from [`crate::Options`].
#[derive(Debug, Clone)]
pub struct ResolverConfig<'a> {
    /// Default alias base and fallback base directory.
    pub root: &'a Path,
    pub alias: &'a BTreeMap<String, String>,
    pub shim: &'a BTreeMap<String, String>,
    /// Extensions to probe (in order).
    pub extensions: &'static [&'static str],
}

/// True when the target is an absolute URL or a `url()` reference: not a
/// file import, the directive is left untouched.
#[must_use]
pub fn is_url(target: &str) -> bool {
    target.starts_with("url(") || target.contains("://")
}

/// Strip one layer of surrounding quotes.
#[must_use]
pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Resolve an import target to a lexically normalized path.
///
/// `basedir` is the directory of the importing file. Relative targets
/// resolve against it directly; package-style targets are rewritten
/// through the alias table first and otherwise looked up in
/// `node_modules` directories walking up from `basedir`.
pub fn resolve_target(
    cfg: &ResolverConfig<'_>,
    target: &str,
    basedir: &Path,
) -> Result<PathBuf, Error> {
    let mut tried = Vec::new();

    let found = if target.starts_with('.') {
        resolve_file(cfg, &basedir.join(target), &mut tried)
    } else if let Some(aliased) = resolve_alias(cfg.alias, cfg.root, target) {
        resolve_file(cfg, &aliased, &mut tried)
    } else {
        resolve_package(cfg, target, basedir, &mut tried)
    };

    match found {
        Some(path) => Ok(normalize(&path)),
        None => Err(Error::UnresolvableImport {
            target: target.to_string(),
            basedir: basedir.to_path_buf(),
            tried,
        }),
    }
}

fn add_tried(tried: &mut Vec<PathBuf>, path: &Path) {
    if tried.len() < MAX_TRIED_PATHS {
        tried.push(path.to_path_buf());
    }
}

fn with_extension_appended(base: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}

/// Resolve a concrete path: exact file, extension probing, then directory
/// entry selection.
fn resolve_file(cfg: &ResolverConfig<'_>, base: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    add_tried(tried, base);

    for ext in cfg.extensions {
        let with_ext = with_extension_appended(base, ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
        add_tried(tried, &with_ext);
    }

    if base.is_dir() {
        return resolve_directory(cfg, base, tried);
    }
    None
}

/// Resolve a directory: package descriptor entry (shim > `style` >
/// default), falling back to `index.css` probing.
fn resolve_directory(
    cfg: &ResolverConfig<'_>,
    dir: &Path,
    tried: &mut Vec<PathBuf>,
) -> Option<PathBuf> {
    if let Some(mut pkg) = read_descriptor(dir) {
        apply_entry(cfg.shim, &mut pkg);
        let entry = dir.join(pkg.main.as_deref().unwrap_or(DEFAULT_ENTRY));
        if entry.is_file() {
            return Some(entry);
        }
        add_tried(tried, &entry);

        for ext in cfg.extensions {
            let with_ext = with_extension_appended(&entry, ext);
            if with_ext.is_file() {
                return Some(with_ext);
            }
            add_tried(tried, &with_ext);
        }
    }

    for ext in cfg.extensions {
        let index = dir.join(format!("index{ext}"));
        if index.is_file() {
            return Some(index);
        }
        add_tried(tried, &index);
    }
    None
}

/// Resolve a package-style target via `node_modules` lookup, walking up
/// from `basedir`.
fn resolve_package(
    cfg: &ResolverConfig<'_>,
    spec: &str,
    basedir: &Path,
    tried: &mut Vec<PathBuf>,
) -> Option<PathBuf> {
    let (name, subpath) = parse_package_specifier(spec);

    let mut current = Some(basedir);
    while let Some(dir) = current {
        let node_modules = dir.join("node_modules");
        if node_modules.is_dir() {
            let base = match subpath {
                Some(sub) => node_modules.join(name).join(sub),
                None => node_modules.join(name),
            };
            if let Some(found) = resolve_file(cfg, &base, tried) {
                return Some(found);
            }
        }
        current = dir.parent();
    }
    None
}

/// Split a package-style target into package name and subpath:
/// `"lodash/fp"` -> `("lodash", Some("fp"))`, `"@scope/pkg/sub"` ->
/// `("@scope/pkg", Some("sub"))`.
fn parse_package_specifier(spec: &str) -> (&str, Option<&str>) {
    if spec.starts_with('@') {
        let mut slashes = spec.match_indices('/');
        let _first = slashes.next();
        match slashes.next() {
            Some((idx, _)) => (&spec[..idx], Some(&spec[idx + 1..])),
            None => (spec, None),
        }
    } else {
        match spec.split_once('/') {
            Some((name, sub)) => (name, Some(sub)),
            None => (spec, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn config<'a>(
        root: &'a Path,
        alias: &'a BTreeMap<String, String>,
        shim: &'a BTreeMap<String, String>,
    ) -> ResolverConfig<'a> {
        ResolverConfig {
            root,
            alias,
            shim,
            extensions: STYLE_EXTENSIONS,
        }
    }

    #[test]
    fn url_targets_are_not_file_imports() {
        assert!(is_url("url(test.css)"));
        assert!(is_url("http://example.com/example.css"));
        assert!(!is_url("./test"));
        assert!(!is_url("package/sub"));
    }

    #[test]
    fn strips_one_quote_layer() {
        assert_eq!(strip_quotes("\"./test\""), "./test");
        assert_eq!(strip_quotes("'./test'"), "./test");
        assert_eq!(strip_quotes("\"'quoted'\""), "'quoted'");
        assert_eq!(strip_quotes("bare"), "bare");
    }

    #[test]
    fn relative_target_with_extension_probing() {
        let dir = tempdir().unwrap();
        write(dir.path(), "test.css", ".t{}");
        let (alias, shim) = (BTreeMap::new(), BTreeMap::new());
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "./test", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("test.css"));
    }

    #[test]
    fn package_lookup_walks_up_node_modules() {
        let dir = tempdir().unwrap();
        write(dir.path(), "node_modules/test/index.css", ".t{}");
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();
        let (alias, shim) = (BTreeMap::new(), BTreeMap::new());
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "test", &dir.path().join("src/deep")).unwrap();
        assert_eq!(found, dir.path().join("node_modules/test/index.css"));
    }

    #[test]
    fn package_style_field_selects_entry() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "node_modules/custom/package.json",
            r#"{"name":"custom","main":"index.js","style":"theme.css"}"#,
        );
        write(dir.path(), "node_modules/custom/theme.css", ".c{}");
        let (alias, shim) = (BTreeMap::new(), BTreeMap::new());
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "custom", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("node_modules/custom/theme.css"));
    }

    #[test]
    fn shim_overrides_package_entry() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "node_modules/pkg-a/package.json",
            r#"{"name":"pkg-a","style":"main.css"}"#,
        );
        write(dir.path(), "node_modules/pkg-a/main.css", ".wrong{}");
        write(dir.path(), "node_modules/pkg-a/alt.css", ".right{}");
        let alias = BTreeMap::new();
        let mut shim = BTreeMap::new();
        shim.insert("pkg-a".to_string(), "alt.css".to_string());
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "pkg-a", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("node_modules/pkg-a/alt.css"));
    }

    #[test]
    fn package_subpath_resolves_inside_package() {
        let dir = tempdir().unwrap();
        write(dir.path(), "node_modules/pkg/lib/part.css", ".p{}");
        let (alias, shim) = (BTreeMap::new(), BTreeMap::new());
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "pkg/lib/part", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("node_modules/pkg/lib/part.css"));
    }

    #[test]
    fn scoped_package_name_parses_as_one_package() {
        assert_eq!(parse_package_specifier("@scope/pkg"), ("@scope/pkg", None));
        assert_eq!(
            parse_package_specifier("@scope/pkg/sub/path"),
            ("@scope/pkg", Some("sub/path"))
        );
        assert_eq!(parse_package_specifier("pkg"), ("pkg", None));
        assert_eq!(parse_package_specifier("pkg/sub"), ("pkg", Some("sub")));
    }

    #[test]
    fn alias_rewrite_wins_over_package_lookup() {
        let dir = tempdir().unwrap();
        write(dir.path(), "styles/index.css", ".s{}");
        write(dir.path(), "node_modules/util/index.css", ".wrong{}");
        let mut alias = BTreeMap::new();
        alias.insert("util".to_string(), "styles".to_string());
        let shim = BTreeMap::new();
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "util", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("styles/index.css"));
    }

    #[test]
    fn unresolvable_reports_tried_candidates() {
        let dir = tempdir().unwrap();
        let (alias, shim) = (BTreeMap::new(), BTreeMap::new());
        let cfg = config(dir.path(), &alias, &shim);
        let err = resolve_target(&cfg, "./missing", dir.path()).unwrap_err();
        let Error::UnresolvableImport { target, tried, .. } = err else {
            panic!("expected unresolvable import");
        };
        assert_eq!(target, "./missing");
        assert!(tried.contains(&dir.path().join("missing.css")));
    }

    #[test]
    fn result_is_lexically_normalized() {
        let dir = tempdir().unwrap();
        write(dir.path(), "styles/a.css", ".a{}");
        write(dir.path(), "sub/.keep", "");
        let (alias, shim) = (BTreeMap::new(), BTreeMap::new());
        let cfg = config(dir.path(), &alias, &shim);
        let found = resolve_target(&cfg, "../styles/a.css", &dir.path().join("sub")).unwrap();
        assert_eq!(found, dir.path().join("styles/a.css"));
    }
}
