//! Recursive `@import` discovery, resolution, and order-preserving
//! inlining.
//!
//! One pass walks the document for import directives, resolves each
//! target, checks-and-records dedup scope membership before any I/O, then
//! reads and expands all queued imports concurrently. Tree mutation is
//! sequential and in original directive order, only after every queued
//! import for the subtree has settled, so output order always matches
//! source order regardless of read completion order.

mod scope;

pub use scope::{ResolutionScope, SharedScope, GLOBAL_SCOPE};

use crate::config::Options;
use crate::doc::parse::parse;
use crate::doc::{Document, NodeId, NodeKind, SourceInfo};
use crate::error::Error;
use crate::resolver::{is_url, resolve_target, strip_quotes, ResolverConfig, STYLE_EXTENSIONS};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::path::{Path, PathBuf};

/// One import queued for expansion. Queue position is fixed at
/// enumeration time; scope membership was already recorded.
struct Queued {
    node: NodeId,
    file: PathBuf,
}

/// Drives one inlining pass over a document.
pub struct Inliner<'a> {
    opts: &'a Options,
}

impl<'a> Inliner<'a> {
    #[must_use]
    pub fn new(opts: &'a Options) -> Self {
        Self { opts }
    }

    /// Run the pass: inject prepended imports, then expand every
    /// resolvable directive, transitively. Any failure aborts the whole
    /// pass with no partial output.
    pub async fn run(&self, doc: &mut Document) -> Result<(), Error> {
        self.prepend_imports(doc);
        let scope = SharedScope::new();
        self.expand_into(&scope, doc, doc.root()).await
    }

    /// Inject synthetic directives for `prepend` targets ahead of the
    /// document's own content. Only the top-level pass does this; nested
    /// parses never re-inject.
    fn prepend_imports(&self, doc: &mut Document) {
        let root = doc.root();
        for (index, target) in self.opts.prepend.iter().enumerate() {
            let kind = NodeKind::Import {
                params: format!("\"{target}\""),
                raw: format!("@import \"{target}\";\n"),
            };
            doc.insert(root, index, kind, SourceInfo::default());
        }
    }

    fn config(&self) -> ResolverConfig<'_> {
        ResolverConfig {
            root: &self.opts.root,
            alias: &self.opts.alias,
            shim: &self.opts.shim,
            extensions: STYLE_EXTENSIONS,
        }
    }

    /// Expand every import directive under `subtree`.
    ///
    /// Enumeration (resolution, dedup check-and-record, removal of
    /// duplicates) is sequential and happens before any read starts;
    /// reads and nested expansions then run concurrently; splice-back is
    /// sequential again, in source order.
    fn expand_into<'s>(
        &'s self,
        scope: &'s SharedScope,
        doc: &'s mut Document,
        subtree: NodeId,
    ) -> BoxFuture<'s, Result<(), Error>> {
        async move {
            let cfg = self.config();
            let mut queued: Vec<Queued> = Vec::new();

            for id in doc.imports_in(subtree) {
                let NodeKind::Import { params, .. } = doc.kind(id) else {
                    continue;
                };
                let target = strip_quotes(params).to_string();
                if is_url(&target) {
                    continue;
                }

                let basedir = doc
                    .source(id)
                    .file
                    .as_deref()
                    .and_then(Path::parent)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map_or_else(|| self.opts.root.clone(), Path::to_path_buf);
                let file = resolve_target(&cfg, &target, &basedir)?;

                let key = scope_key(doc, id);
                if scope.check_and_record(&key, &file) {
                    queued.push(Queued { node: id, file });
                } else {
                    doc.remove(id);
                }
            }

            let expanded =
                try_join_all(queued.iter().map(|q| self.load(scope, q.file.clone()))).await?;

            for (q, sub) in queued.iter().zip(&expanded) {
                doc.splice(q.node, sub);
            }
            Ok(())
        }
        .boxed()
    }

    /// Read, prefilter, parse, and recursively expand one imported file.
    async fn load(&self, scope: &SharedScope, file: PathBuf) -> Result<Document, Error> {
        let text = tokio::fs::read_to_string(&file)
            .await
            .map_err(|source| Error::Io {
                path: file.clone(),
                source,
            })?;
        let text = match &self.opts.prefilter {
            Some(prefilter) => prefilter(text, &file),
            None => text,
        };

        let mut sub = parse(&text, Some(&file))?;
        let root = sub.root();
        self.expand_into(scope, &mut sub, root).await?;

        if self.opts.include_plugins {
            for plugin in &self.opts.plugins {
                plugin(&mut sub)?;
            }
        }
        Ok(sub)
    }
}

/// Dedup scope key for a directive: the params text of the nearest
/// enclosing conditional group, or [`GLOBAL_SCOPE`] at the document top
/// level.
#[must_use]
pub fn scope_key(doc: &Document, id: NodeId) -> String {
    let mut current = doc.parent(id);
    while let Some(ancestor) = current {
        if let NodeKind::Group { params, .. } = doc.kind(ancestor) {
            return params.clone();
        }
        current = doc.parent(ancestor);
    }
    GLOBAL_SCOPE.to_string()
}
