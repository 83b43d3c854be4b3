//! Stylesheet document model.
//!
//! An arena of nodes addressed by stable ids, with explicit parent/child
//! tables instead of back-pointer mutation. The model is deliberately
//! coarse: the inliner only needs to tell import directives and
//! conditional groups apart, so every other construct is kept as a
//! verbatim source slice and untouched input serializes byte-identically.

pub mod parse;

use crate::paths::relative_label;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Stable identifier for a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Where a node came from, for source mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    /// Path of the originating file, when known.
    pub file: Option<PathBuf>,
    /// 1-based line of the statement start.
    pub line: u32,
    /// 0-based column of the statement start.
    pub column: u32,
}

/// The closed set of node kinds the inliner distinguishes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Document root. Children only, never serialized itself.
    Root,
    /// `@import <params>;`
    Import {
        /// Parameter text between the at-keyword and the terminator.
        params: String,
        /// Exact source slice of the whole statement.
        raw: String,
    },
    /// Any at-rule with a block (`@media`, `@supports`, ...). Children are
    /// parsed; `header` runs from the at-keyword through the opening brace
    /// and `footer` from the last child through the closing brace.
    Group {
        params: String,
        header: String,
        footer: String,
    },
    /// Anything else (style rules, statement at-rules, stray comments),
    /// kept as an exact source slice.
    Verbatim { raw: String },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Trivia (whitespace, comments) preceding the statement. Removed with
    /// the node.
    lead: String,
    source: SourceInfo,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One generated-line entry of the lightweight source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    /// 1-based line in the serialized output.
    pub generated_line: u32,
    /// Source label, relative to the mapping root when possible.
    pub source: String,
    /// 1-based line in the source file.
    pub original_line: u32,
    /// 0-based column in the source file.
    pub original_column: u32,
}

/// Order-preserving stylesheet tree.
///
/// Nodes live in an arena and are addressed by [`NodeId`]; detached nodes
/// keep their slot but become unreachable. Spliced-in content is adopted
/// (deep-copied) from the donor document's arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// Trivia after the last top-level statement.
    tail: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                lead: String::new(),
                source: SourceInfo::default(),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            tail: String::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.node_mut(id).kind
    }

    #[must_use]
    pub fn source(&self, id: NodeId) -> &SourceInfo {
        &self.node(id).source
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub(crate) fn set_tail(&mut self, tail: String) {
        self.tail = tail;
    }

    fn alloc(&mut self, kind: NodeKind, lead: String, source: SourceInfo, parent: NodeId) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            lead,
            source,
            parent: Some(parent),
            children: Vec::new(),
        });
        id
    }

    /// Append a child node, returning its id.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, lead: String, source: SourceInfo) -> NodeId {
        let id = self.alloc(kind, lead, source, parent);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Insert a child at `index` within the parent's child list.
    pub fn insert(&mut self, parent: NodeId, index: usize, kind: NodeKind, source: SourceInfo) -> NodeId {
        let id = self.alloc(kind, String::new(), source, parent);
        let kids = &mut self.node_mut(parent).children;
        let index = index.min(kids.len());
        kids.insert(index, id);
        id
    }

    /// Detach a node (and its subtree) from its parent. The arena slot
    /// stays allocated; the node is simply unreachable.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            let kids = &mut self.node_mut(parent).children;
            if let Some(pos) = kids.iter().position(|&c| c == id) {
                kids.remove(pos);
            }
            self.node_mut(id).parent = None;
        }
    }

    /// Replace `target` with the top-level nodes of `other` at the same
    /// position, then detach `target`. The donor's trailing trivia is
    /// carried over so imported file contents survive byte-for-byte.
    pub fn splice(&mut self, target: NodeId, other: &Document) {
        let Some(parent) = self.node(target).parent else {
            return;
        };

        let mut adopted = Vec::new();
        for &child in other.children(other.root()) {
            adopted.push(self.adopt(other, child, parent));
        }
        if !other.tail.is_empty() {
            adopted.push(self.alloc(
                NodeKind::Verbatim {
                    raw: other.tail.clone(),
                },
                String::new(),
                SourceInfo::default(),
                parent,
            ));
        }

        // The directive's leading trivia survives on the first spliced
        // node, keeping statement separators intact.
        if let Some(&first) = adopted.first() {
            let lead = self.node(target).lead.clone();
            if !lead.is_empty() {
                let first_lead = &mut self.node_mut(first).lead;
                *first_lead = format!("{lead}{first_lead}");
            }
        }

        let kids = &mut self.node_mut(parent).children;
        let pos = kids
            .iter()
            .position(|&c| c == target)
            .unwrap_or(kids.len());
        kids.splice(pos..pos, adopted);
        self.remove(target);
    }

    /// Deep-copy a subtree from `other` into this arena under `parent`.
    /// The new top-level id is returned but not linked into `parent`'s
    /// child list; the caller decides its position.
    fn adopt(&mut self, other: &Document, id: NodeId, parent: NodeId) -> NodeId {
        let src = other.node(id);
        let new_id = self.alloc(src.kind.clone(), src.lead.clone(), src.source.clone(), parent);
        for &child in &src.children {
            let adopted = self.adopt(other, child, new_id);
            self.node_mut(new_id).children.push(adopted);
        }
        new_id
    }

    /// Import directives under `subtree`, deep, in document order.
    #[must_use]
    pub fn imports_in(&self, subtree: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_imports(subtree, &mut out);
        out
    }

    fn collect_imports(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.node(id).children {
            if matches!(self.node(child).kind, NodeKind::Import { .. }) {
                out.push(child);
            }
            self.collect_imports(child, out);
        }
    }

    /// Serialize to CSS text.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut emitter = Emitter::new(None);
        self.emit_into(self.root, &mut emitter);
        emitter.push(&self.tail);
        emitter.out
    }

    /// Serialize and collect line mappings, labeling sources relative to
    /// `root` when possible.
    #[must_use]
    pub fn to_css_with_map(&self, root: &Path) -> (String, Vec<Mapping>) {
        let mut emitter = Emitter::new(Some(root));
        self.emit_into(self.root, &mut emitter);
        emitter.push(&self.tail);
        (emitter.out, emitter.map)
    }

    fn emit_into(&self, id: NodeId, emitter: &mut Emitter<'_>) {
        for &child in &self.node(id).children {
            let node = self.node(child);
            emitter.push(&node.lead);
            match &node.kind {
                NodeKind::Root => {}
                NodeKind::Import { raw, .. } | NodeKind::Verbatim { raw } => {
                    emitter.mark(&node.source);
                    emitter.push(raw);
                }
                NodeKind::Group { header, footer, .. } => {
                    emitter.mark(&node.source);
                    emitter.push(header);
                    self.emit_into(child, emitter);
                    emitter.push(footer);
                }
            }
        }
    }
}

struct Emitter<'a> {
    out: String,
    map: Vec<Mapping>,
    root: Option<&'a Path>,
    line: u32,
}

impl<'a> Emitter<'a> {
    fn new(root: Option<&'a Path>) -> Self {
        Self {
            out: String::new(),
            map: Vec::new(),
            root,
            line: 1,
        }
    }

    fn push(&mut self, text: &str) {
        self.line += u32::try_from(text.matches('\n').count()).unwrap_or(0);
        self.out.push_str(text);
    }

    fn mark(&mut self, source: &SourceInfo) {
        let (Some(root), Some(file)) = (self.root, source.file.as_deref()) else {
            return;
        };
        self.map.push(Mapping {
            generated_line: self.line,
            source: relative_label(root, file),
            original_line: source.line,
            original_column: source.column,
        });
    }
}
