//! Engine scenarios against real stylesheet trees.

use crate::common::TestProject;
use scss_bundler::bundler::{BundleOptions, Bundler};
use scss_bundler::constants::{CIRCULAR_MARKER, MARKER_END, NOT_FOUND_MARKER};
use scss_bundler::core::BundleError;
use scss_bundler::directive::ImportFilter;
use scss_bundler::pattern::DedupSet;
use scss_bundler::test_utils::init_test_logging;
use std::path::Path;

const NO_GLOBS: &[&str] = &[];

/// A small site: an entry, shared partials, and components that reuse them.
fn create_site(project: &TestProject) {
    project
        .write(
            "src/main.scss",
            "@import 'base/variables';\n@import 'components/button';\n@import 'components/card';\n.main {}\n",
        )
        .unwrap();
    project.write("src/base/_variables.scss", "$primary: blue;").unwrap();
    project
        .write("src/components/_button.scss", "@import '../base/variables';\n.button {}")
        .unwrap();
    project
        .write("src/components/card.scss", "@import '../base/variables';\n.card {}")
        .unwrap();
}

#[tokio::test]
async fn test_partial_resolution_prefers_plain_file() {
    init_test_logging(None);
    let project = TestProject::new().unwrap();
    project.write("main.scss", "@import 'button';\n@import 'theme';").unwrap();
    project.write("_button.scss", ".partial {}").unwrap();
    project.write("theme.scss", ".plain-theme {}").unwrap();
    project.write("_theme.scss", ".partial-theme {}").unwrap();

    let node = project.bundler().bundle(Path::new("main.scss"), NO_GLOBS).await.unwrap();

    assert_eq!(node.content_str(), ".partial {}\n.plain-theme {}");
    assert_eq!(node.imports[0].path, project.path("_button.scss"));
    assert_eq!(node.imports[1].path, project.path("theme.scss"));
}

#[tokio::test]
async fn test_explicit_suffix_is_not_doubled() {
    let project = TestProject::new().unwrap();
    project.write("main.scss", "@import \"reset.scss\";\n.main {}").unwrap();
    project.write("reset.scss", "* { margin: 0; }").unwrap();

    let node = project.bundler().bundle(Path::new("main.scss"), NO_GLOBS).await.unwrap();

    assert_eq!(node.content_str(), "* { margin: 0; }\n.main {}");
}

#[tokio::test]
async fn test_not_found_marker_keeps_directive_text() {
    let project = TestProject::new().unwrap();
    project.write("a.scss", ".before {}\n@import 'missing';\n.after {}").unwrap();

    let node = project.bundler().bundle(Path::new("a.scss"), NO_GLOBS).await.unwrap();

    assert!(node.found);
    assert_eq!(
        node.content_str(),
        format!(".before {{}}\n{NOT_FOUND_MARKER}\n@import 'missing';{MARKER_END}\n.after {{}}")
    );
    assert!(!node.imports[0].found);
    assert_eq!(node.imports[0].path, project.path("missing.scss"));
}

#[tokio::test]
async fn test_dedupe_inlines_shared_partial_at_first_site() {
    init_test_logging(None);
    let project = TestProject::new().unwrap();
    create_site(&project);

    let bundler = project.bundler();
    let node = bundler.bundle(Path::new("src/main.scss"), &["src/base/*.scss"]).await.unwrap();

    assert_eq!(
        node.content_str(),
        "$primary: blue;\n\n.button {}\n\n.card {}\n.main {}\n"
    );

    let variables = project.path("src/base/_variables.scss");
    assert!(!node.imports[0].deduped);
    assert!(node.imports[1].imports[0].deduped);
    assert!(node.imports[2].imports[0].deduped);
    assert_eq!(bundler.state().read_count(&variables), 1);
    assert_eq!(bundler.state().usage_count(&variables), 3);
    assert_eq!(bundler.state().stats().deduped, 2);
}

#[tokio::test]
async fn test_without_dedupe_shared_partial_is_inlined_everywhere() {
    let project = TestProject::new().unwrap();
    create_site(&project);

    let bundler = project.bundler();
    let node = bundler.bundle(Path::new("src/main.scss"), NO_GLOBS).await.unwrap();

    assert_eq!(node.content_str().matches("$primary: blue;").count(), 3);
    assert_eq!(bundler.state().read_count(&project.path("src/base/_variables.scss")), 1);
    assert_eq!(bundler.state().stats().deduped, 0);
}

#[tokio::test]
async fn test_dedupe_glob_only_affects_matching_files() {
    let project = TestProject::new().unwrap();
    project
        .write("main.scss", "@import 'shared/a';\n@import 'shared/a';\n@import 'b';\n@import 'b';")
        .unwrap();
    project.write("shared/a.scss", ".a {}").unwrap();
    project.write("b.scss", ".b {}").unwrap();

    let node = project.bundler().bundle(Path::new("main.scss"), &["shared/**/*.scss"]).await.unwrap();

    assert_eq!(node.content_str(), ".a {}\n\n.b {}\n.b {}");
    let flags: Vec<bool> = node.imports.iter().map(|child| child.deduped).collect();
    assert_eq!(flags, vec![false, true, false, false]);
}

#[tokio::test]
async fn test_prebuilt_dedup_set() {
    let project = TestProject::new().unwrap();
    project.write("main.scss", "@import 'a';\n@import 'a';\n@import 'b';\n@import 'b';").unwrap();
    project.write("a.scss", ".a {}").unwrap();
    project.write("b.scss", ".b {}").unwrap();

    let dedup = DedupSet::from_paths([project.path("sub/../b.scss")]);
    let node = project.bundler().bundle_with_dedup(Path::new("main.scss"), &dedup).await;

    assert_eq!(node.content_str(), ".a {}\n.a {}\n.b {}\n");
}

#[tokio::test]
async fn test_deduped_node_keeps_child_list() {
    let project = TestProject::new().unwrap();
    project.write("main.scss", "@import 'mid';\n@import 'mid';").unwrap();
    project.write("_mid.scss", "@import 'leaf';\n.mid {}").unwrap();
    project.write("_leaf.scss", ".leaf {}").unwrap();

    let node = project.bundler().bundle(Path::new("main.scss"), &["_mid.scss"]).await.unwrap();

    let second = &node.imports[1];
    assert!(second.deduped);
    assert!(second.found);
    assert_eq!(second.imports.len(), 1);
    assert_eq!(second.imports[0].path, project.path("_leaf.scss"));
}

#[tokio::test]
async fn test_mutual_imports_are_cut_with_marker() {
    init_test_logging(None);
    let project = TestProject::new().unwrap();
    project.write("a.scss", "@import 'b';\n.a {}").unwrap();
    project.write("b.scss", "@import 'a';\n.b {}").unwrap();

    let bundler = project.bundler();
    let node = bundler.bundle(Path::new("a.scss"), NO_GLOBS).await.unwrap();

    assert_eq!(
        node.content_str(),
        format!("{CIRCULAR_MARKER}\n@import 'a';{MARKER_END}\n.b {{}}\n.a {{}}")
    );
    let back_edge = &node.imports[0].imports[0];
    assert!(back_edge.cyclic);
    assert!(!back_edge.found);
    assert_eq!(back_edge.path, project.path("a.scss"));
    assert_eq!(bundler.state().stats().cycles, 1);
}

#[tokio::test]
async fn test_include_paths_and_ignored_imports() {
    let project = TestProject::new().unwrap();
    project
        .write(
            "src/main.scss",
            "@import '~bootstrap/scss/grid';\n@import 'mixins';\n@import 'print.css';\n.main {}",
        )
        .unwrap();
    project.write("vendor/_mixins.scss", "@mixin m {}").unwrap();

    let filter = ImportFilter::new(&["^~", r"\.css$"]).unwrap();
    let options = BundleOptions::new(project.root())
        .with_include_paths(vec![project.path("vendor")])
        .with_ignore_imports(filter);
    let bundler = Bundler::new(options);

    let node = bundler.bundle(Path::new("src/main.scss"), NO_GLOBS).await.unwrap();

    assert_eq!(
        node.content_str(),
        "@import '~bootstrap/scss/grid';\n@mixin m {}\n@import 'print.css';\n.main {}"
    );
    assert_eq!(node.imports.len(), 1);
    assert_eq!(node.imports[0].path, project.path("vendor/_mixins.scss"));
}

#[tokio::test]
async fn test_bundling_is_idempotent_with_fresh_caches() {
    let project = TestProject::new().unwrap();
    create_site(&project);
    project.write("src/extra.scss", "@import 'missing';\n@import 'main';").unwrap();

    let first = project.bundler().bundle(Path::new("src/extra.scss"), &["src/**/*.scss"]).await.unwrap();
    let second = project.bundler().bundle(Path::new("src/extra.scss"), &["src/**/*.scss"]).await.unwrap();

    assert_eq!(first.content_str(), second.content_str());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_entry_is_not_an_error() {
    let project = TestProject::new().unwrap();

    let node = project.bundler().bundle(Path::new("nope.scss"), NO_GLOBS).await.unwrap();

    assert!(!node.found);
    assert!(node.content.is_none());
    assert_eq!(node.path, project.path("nope.scss"));
}

#[tokio::test]
async fn test_invalid_dedupe_glob_fails_the_run() {
    let project = TestProject::new().unwrap();
    project.write("main.scss", ".main {}").unwrap();

    let err = project.bundler().bundle(Path::new("main.scss"), &["src/[*.scss"]).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BundleError>(),
        Some(BundleError::InvalidGlobPattern { .. })
    ));
}
