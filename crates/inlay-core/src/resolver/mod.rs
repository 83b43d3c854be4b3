//! Import-target classification and npm-style path resolution.
//!
//! Supports:
//! - Relative targets: `./`, `../`
//! - Package-style targets with `node_modules` lookup, walking up
//! - Alias rewriting, composable across path segments
//! - Extension probing restricted to stylesheet files
//! - Directory resolution (package descriptor entry, `index.css`)
//! - Shim overrides for a package's entry file

mod alias;
mod pkg;
mod walk;

pub use alias::resolve_alias;
pub use pkg::{apply_entry, read_descriptor, PackageDescriptor, DEFAULT_ENTRY};
pub use walk::{is_url, resolve_target, strip_quotes, ResolverConfig, STYLE_EXTENSIONS};
