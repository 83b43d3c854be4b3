//! End-to-end inlining tests over fixture trees.

use inlay_core::{Document, Error, NodeKind, Options, SourceInfo};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Fixture tree with a test file and two packages, roughly what a small
/// project's node_modules looks like.
fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "a.css", ".a { color: red }\n");
    write(root, "b.css", ".b { color: blue }\n");
    write(root, "node_modules/test/package.json", r#"{"name":"test"}"#);
    write(
        root,
        "node_modules/test/index.css",
        ".test { content: \"Test package\" }\n",
    );
    write(
        root,
        "node_modules/custom/package.json",
        r#"{"name":"custom","main":"index.js","style":"custom.css"}"#,
    );
    write(
        root,
        "node_modules/custom/custom.css",
        ".custom { content: \"Custom package\" }\n",
    );
    dir
}

async fn flatten(dir: &TempDir, input: &str, opts: &Options) -> String {
    flatten_doc(dir, input, opts).await.unwrap().to_css()
}

async fn flatten_doc(dir: &TempDir, input: &str, opts: &Options) -> Result<Document, Error> {
    let from = dir.path().join("index.css");
    inlay_core::process(input, Some(&from), opts).await
}

#[tokio::test]
async fn imports_relative_file() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"./a\";", &opts).await;
    assert_eq!(out, ".a { color: red }\n");
}

#[tokio::test]
async fn imports_single_quoted_target() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import './a';", &opts).await;
    assert_eq!(out, ".a { color: red }\n");
}

#[tokio::test]
async fn imports_package() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"test\";", &opts).await;
    assert_eq!(out, ".test { content: \"Test package\" }\n");
}

#[tokio::test]
async fn imports_package_with_custom_style_entry() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"custom\";", &opts).await;
    assert_eq!(out, ".custom { content: \"Custom package\" }\n");
}

#[tokio::test]
async fn expands_imports_of_imported_packages() {
    let dir = fixture();
    write(
        dir.path(),
        "node_modules/nested/index.css",
        "@import \"test\";\n",
    );
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"nested\";", &opts).await;
    assert_eq!(out.trim_end(), ".test { content: \"Test package\" }");
}

#[tokio::test]
async fn siblings_keep_source_order() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"./a\";\n@import \"./b\";", &opts).await;
    assert_eq!(out, ".a { color: red }\n\n.b { color: blue }\n");
}

#[tokio::test]
async fn repeated_import_at_same_scope_expands_once() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"./a\";\n@import \"./a\";", &opts).await;
    assert_eq!(out, ".a { color: red }\n");
}

#[tokio::test]
async fn different_media_conditions_each_expand() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let input =
        "@media (min-width: 320px) {@import \"./a\";}@media (min-width: 640px) {@import \"./a\";}";
    let out = flatten(&dir, input, &opts).await;
    assert_eq!(
        out,
        "@media (min-width: 320px) {.a { color: red }\n}\
         @media (min-width: 640px) {.a { color: red }\n}"
    );
}

#[tokio::test]
async fn outer_import_suppresses_media_repeat() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let input = "@import \"./a\";\n@media (min-width: 320px) { @import \"./a\"; }";
    let out = flatten(&dir, input, &opts).await;
    assert_eq!(out, ".a { color: red }\n\n@media (min-width: 320px) { }");
}

#[tokio::test]
async fn url_imports_pass_through_byte_identical() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    for input in [
        "@import url(test.css);",
        "@import \"http://example.com/example.css\";",
    ] {
        let out = flatten(&dir, input, &opts).await;
        assert_eq!(out, input);
    }
}

#[tokio::test]
async fn map_labels_are_root_relative() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let doc = flatten_doc(&dir, "@import \"test\";", &opts).await.unwrap();
    let (_, map) = doc.to_css_with_map(dir.path());
    assert_eq!(map[0].generated_line, 1);
    assert_eq!(map[0].source, "node_modules/test/index.css");
    assert_eq!(map[0].original_line, 1);
    assert_eq!(map[0].original_column, 0);
}

#[tokio::test]
async fn map_labels_respect_configured_root() {
    let dir = fixture();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    let opts = Options::new(dir.path());
    let doc = flatten_doc(&dir, "@import \"test\";", &opts).await.unwrap();
    let (_, map) = doc.to_css_with_map(&dir.path().join("sub"));
    assert_eq!(map[0].source, "../node_modules/test/index.css");
}

#[tokio::test]
async fn shim_overrides_declared_style_entry() {
    let dir = fixture();
    write(
        dir.path(),
        "node_modules/shimmed/package.json",
        r#"{"name":"shimmed","style":"main.css"}"#,
    );
    write(dir.path(), "node_modules/shimmed/main.css", ".wrong {}\n");
    write(
        dir.path(),
        "node_modules/shimmed/styles.css",
        ".shimmed { content: \"Shimmed package\" }\n",
    );
    let opts = Options::new(dir.path()).with_shim("shimmed", "styles.css");
    let out = flatten(&dir, "@import \"shimmed\";", &opts).await;
    assert_eq!(out, ".shimmed { content: \"Shimmed package\" }\n");
}

#[tokio::test]
async fn alias_resolves_exact_name() {
    let dir = fixture();
    write(dir.path(), "styles/index.css", ".test { content: \"Test file\" }\n");
    let opts = Options::new(dir.path()).with_alias("tree", "styles/index.css");
    let out = flatten(&dir, "@import \"tree\";", &opts).await;
    assert_eq!(out, ".test { content: \"Test file\" }\n");
}

#[tokio::test]
async fn alias_resolves_directory_index() {
    let dir = fixture();
    write(dir.path(), "styles/index.css", ".test { content: \"Test file\" }\n");
    let opts = Options::new(dir.path()).with_alias("util", "styles");
    let out = flatten(&dir, "@import \"util\";", &opts).await;
    assert_eq!(out, ".test { content: \"Test file\" }\n");
}

#[tokio::test]
async fn alias_resolves_file_in_aliased_directory() {
    let dir = fixture();
    write(dir.path(), "styles/index.css", ".test { content: \"Test file\" }\n");
    let opts = Options::new(dir.path()).with_alias("util", "styles");
    let out = flatten(&dir, "@import \"util/index\";", &opts).await;
    assert_eq!(out, ".test { content: \"Test file\" }\n");
}

#[tokio::test]
async fn prefilter_rewrites_raw_content() {
    let dir = fixture();
    write(
        dir.path(),
        "styles/unfiltered.css",
        ".test { $replaceThis: \"Test file\" }\n",
    );
    let opts = Options::new(dir.path()).with_prefilter(Arc::new(|content: String, _: &Path| {
        content.replace("$replaceThis", "content")
    }));
    let out = flatten(&dir, "@import \"./styles/unfiltered.css\";", &opts).await;
    assert_eq!(out, ".test { content: \"Test file\" }\n");
}

#[tokio::test]
async fn prefilter_applies_to_nested_imports() {
    let dir = fixture();
    write(
        dir.path(),
        "styles/unfiltered.css",
        ".test { $replaceThis: \"Test file\" }\n",
    );
    write(
        dir.path(),
        "styles/nested-unfiltered.css",
        "@import \"./unfiltered.css\";\n",
    );
    let opts = Options::new(dir.path()).with_prefilter(Arc::new(|content: String, _: &Path| {
        content.replace("$replaceThis", "content")
    }));
    let out = flatten(&dir, "@import \"./styles/nested-unfiltered.css\";", &opts).await;
    assert_eq!(out.trim_end(), ".test { content: \"Test file\" }");
}

#[tokio::test]
async fn prepend_targets_expand_before_content() {
    let dir = fixture();
    let opts = Options::new(dir.path())
        .with_prepend("./a")
        .with_prepend("./b");
    let out = flatten(&dir, ".basic-css{property:value;}", &opts).await;
    assert_eq!(
        out,
        ".a { color: red }\n.b { color: blue }\n.basic-css{property:value;}"
    );
}

#[tokio::test]
async fn unresolvable_import_fails_the_pass() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let err = flatten_doc(&dir, "@import \"./missing\";", &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvableImport { .. }));
}

#[tokio::test]
async fn any_failure_discards_partial_output() {
    let dir = fixture();
    let opts = Options::new(dir.path());
    let result = flatten_doc(&dir, "@import \"./a\";\n@import \"./missing\";", &opts).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn concurrent_branches_retain_one_copy() {
    let dir = fixture();
    write(dir.path(), "c.css", ".c { color: green }\n");
    write(dir.path(), "x.css", "@import \"./c\";\n.x{}\n");
    write(dir.path(), "y.css", "@import \"./c\";\n.y{}\n");
    let opts = Options::new(dir.path());
    let out = flatten(&dir, "@import \"./x\";\n@import \"./y\";", &opts).await;
    assert_eq!(out.matches(".c { color: green }").count(), 1);
    let x = out.find(".x{}").unwrap();
    let y = out.find(".y{}").unwrap();
    assert!(x < y);
}

#[tokio::test]
async fn plugins_run_on_nested_parses_only_when_included() {
    let marker: inlay_core::Plugin = Arc::new(|doc: &mut Document| {
        let root = doc.root();
        doc.push(
            root,
            NodeKind::Verbatim {
                raw: "/*p*/".into(),
            },
            String::new(),
            SourceInfo::default(),
        );
        Ok(())
    });

    let dir = fixture();
    let opts = Options::new(dir.path()).with_plugin(marker.clone());
    let out = flatten(&dir, "@import \"./a\";", &opts).await;
    assert_eq!(out.matches("/*p*/").count(), 1);

    let opts = Options::new(dir.path())
        .with_plugin(marker)
        .with_include_plugins(true);
    let out = flatten(&dir, "@import \"./a\";", &opts).await;
    assert_eq!(out.matches("/*p*/").count(), 2);
}
