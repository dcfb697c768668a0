//! Batches of entries bundled concurrently over one set of caches.

use crate::common::TestProject;
use scss_bundler::bundler::{BundleOptions, Bundler};
use scss_bundler::test_utils::init_test_logging;
use std::path::PathBuf;

const NO_GLOBS: &[&str] = &[];

fn create_two_entries(project: &TestProject) -> Vec<PathBuf> {
    project.write("src/_shared.scss", "@import 'tokens';\n.shared {}").unwrap();
    project.write("src/_tokens.scss", "$gap: 4px;").unwrap();
    vec![
        project.write("src/one.scss", "@import 'shared';\n.one {}").unwrap(),
        project.write("src/two.scss", "@import 'shared';\n.two {}").unwrap(),
    ]
}

#[tokio::test]
async fn test_shared_file_is_read_once_per_batch() {
    init_test_logging(None);
    let project = TestProject::new().unwrap();
    let entries = create_two_entries(&project);

    let bundler = project.bundler();
    let nodes = bundler.bundle_all(&entries, NO_GLOBS).await.unwrap();

    assert_eq!(nodes[0].content_str(), "$gap: 4px;\n.shared {}\n.one {}");
    assert_eq!(nodes[1].content_str(), "$gap: 4px;\n.shared {}\n.two {}");

    let state = bundler.state();
    assert_eq!(state.read_count(&project.path("src/_shared.scss")), 1);
    assert_eq!(state.read_count(&project.path("src/_tokens.scss")), 1);
    assert_eq!(state.usage_count(&project.path("src/_shared.scss")), 2);
    assert_eq!(state.stats().files_read, 4);
    assert_eq!(
        state.cached_content(&project.path("src/_shared.scss")).as_deref(),
        Some("$gap: 4px;\n.shared {}")
    );
}

#[tokio::test]
async fn test_dedupe_across_entries_inlines_shared_file_once() {
    let project = TestProject::new().unwrap();
    let entries = create_two_entries(&project);

    let bundler = project.bundler();
    let nodes = bundler.bundle_all(&entries, &["src/_shared.scss"]).await.unwrap();

    // Usage is counted per run, so only whichever entry got there first inlines it.
    let inlined = nodes.iter().filter(|node| node.content_str().contains(".shared {}")).count();
    let deduped = nodes.iter().filter(|node| node.imports[0].deduped).count();
    assert_eq!(inlined, 1);
    assert_eq!(deduped, 1);
    assert_eq!(bundler.state().read_count(&project.path("src/_shared.scss")), 1);
}

#[tokio::test]
async fn test_results_keep_input_order() {
    let project = TestProject::new().unwrap();
    let mut entries = Vec::new();
    for i in 0..25 {
        let name = format!("entry{i}.scss");
        entries.push(project.write(&name, &format!(".e{i} {{}}")).unwrap());
    }
    entries.insert(3, project.path("missing.scss"));

    let bundler = Bundler::new(BundleOptions::new(project.root()).with_max_parallel(4));
    let nodes = bundler.bundle_all(&entries, NO_GLOBS).await.unwrap();

    assert_eq!(nodes.len(), entries.len());
    for (node, entry) in nodes.iter().zip(&entries) {
        assert_eq!(&node.path, entry);
    }
    assert!(!nodes[3].found);
    assert_eq!(nodes[4].content_str(), ".e3 {}");
}

#[tokio::test]
async fn test_entry_listed_twice_is_read_once() {
    let project = TestProject::new().unwrap();
    let entry = project.write("main.scss", "@import 'a';").unwrap();
    project.write("a.scss", ".a {}").unwrap();

    let bundler = project.bundler();
    let nodes = bundler.bundle_all(&[entry.clone(), entry.clone()], NO_GLOBS).await.unwrap();

    assert_eq!(nodes[0], nodes[1]);
    assert_eq!(nodes[1].content_str(), ".a {}");
    assert_eq!(bundler.state().read_count(&entry), 1);
    assert_eq!(bundler.state().usage_count(&project.path("a.scss")), 1);
}

#[tokio::test]
async fn test_parallel_entries_with_crossed_imports_do_not_deadlock() {
    let project = TestProject::new().unwrap();
    let entries = vec![
        project.write("a.scss", "@import 'b';\n.a {}").unwrap(),
        project.write("b.scss", "@import 'a';\n.b {}").unwrap(),
    ];

    let bundler = project.bundler();
    let nodes = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        bundler.bundle_all(&entries, NO_GLOBS),
    )
    .await
    .expect("batch should not hang")
    .unwrap();

    // Both entries may see the back edge when they enter at the same moment.
    assert!(nodes.iter().all(|node| node.found));
    assert!(bundler.state().stats().cycles >= 1);
    assert_eq!(bundler.state().read_count(&entries[0]), 1);
    assert_eq!(bundler.state().read_count(&entries[1]), 1);
}
