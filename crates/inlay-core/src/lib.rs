#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! npm-style `@import` resolution and inlining for CSS.
//!
//! Given a stylesheet, recursively resolves `@import` directives whose
//! targets are package-style names, locates the matching stylesheet file
//! with Node-module-style resolution (`node_modules` walk, `.css` probing,
//! package descriptor entry selection), and inlines the pre-filtered
//! contents in place, in source order, producing a single flattened
//! document free of package-level imports.
//!
//! Absolute URLs and `url()` references are left untouched. Repeat
//! imports are dropped, deduplicated per nesting context: a file imported
//! at the document top level is suppressed everywhere, while a file
//! imported under a conditional group is suppressed only within that exact
//! condition text.

pub mod config;
pub mod doc;
pub mod error;
pub mod inline;
pub mod paths;
pub mod resolver;

pub use config::{Options, Plugin, Prefilter};
pub use doc::parse::parse;
pub use doc::{Document, Mapping, NodeId, NodeKind, SourceInfo};
pub use error::Error;
pub use inline::{scope_key, Inliner, ResolutionScope, SharedScope, GLOBAL_SCOPE};
pub use resolver::{is_url, resolve_target, strip_quotes, ResolverConfig, STYLE_EXTENSIONS};

use std::path::Path;

/// Parse `css`, inline every resolvable import, and run the host plugin
/// list over the flattened document.
///
/// `from` is the path of the input file; it provides the base directory
/// for relative imports and the source label for mappings. When absent,
/// relative imports resolve against the configured root.
pub async fn process(css: &str, from: Option<&Path>, opts: &Options) -> Result<Document, Error> {
    let mut document = parse(css, from)?;
    inline_document(&mut document, opts).await?;
    Ok(document)
}

/// Inline every resolvable import in `document`, then run the host
/// plugins. Any error aborts the whole pass; there is no partial output.
pub async fn inline_document(document: &mut Document, opts: &Options) -> Result<(), Error> {
    Inliner::new(opts).run(document).await?;
    for plugin in &opts.plugins {
        plugin(document)?;
    }
    Ok(())
}
