//! The compiled binary: `bundle`, `tree`, configuration files and exit codes.

use crate::common::{FileAssert, TestProject};
use assert_cmd::Command;
use predicates::prelude::*;

fn create_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write("src/main.scss", "@import 'base';\n@import 'base';\n.main {}\n").unwrap();
    project.write("src/admin.scss", "@import 'base';\n.admin {}\n").unwrap();
    project.write("src/_base.scss", "body { margin: 0; }").unwrap();
    project
}

#[test]
fn test_bundle_to_stdout() {
    let project = create_project();

    project
        .run(&["bundle", "src/main.scss"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("body { margin: 0; }\nbody { margin: 0; }\n.main {}\n");
}

#[test]
fn test_bundle_with_dedupe_to_out_file() {
    let project = create_project();

    project
        .run(&["bundle", "src/main.scss", "--dedupe", "src/_*.scss", "-o", "dist/main.css"])
        .unwrap()
        .assert_success()
        .assert_stderr_contains("Bundled 1 of 1 entry");

    FileAssert::equals(project.path("dist/main.css"), "body { margin: 0; }\n\n.main {}\n");
}

#[test]
fn test_bundle_many_entries_to_out_dir() {
    let project = create_project();

    project.run(&["bundle", "src/main.scss", "src/admin.scss", "--out-dir", "dist"]).unwrap().assert_success();

    FileAssert::exists(project.path("dist/main.scss"));
    FileAssert::equals(project.path("dist/admin.scss"), "body { margin: 0; }\n.admin {}\n");
}

#[test]
fn test_out_file_with_many_entries_is_rejected() {
    let project = create_project();

    project
        .run(&["bundle", "src/main.scss", "src/admin.scss", "-o", "dist/all.scss"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Configuration error");

    FileAssert::not_exists(project.path("dist/all.scss"));
}

#[test]
fn test_out_dir_name_collision_writes_nothing() {
    let project = TestProject::new().unwrap();
    project.write("x/main.scss", ".x {}").unwrap();
    project.write("y/main.scss", ".y {}").unwrap();

    project
        .run(&["bundle", "x/main.scss", "y/main.scss", "--out-dir", "dist"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("would both be written to");

    FileAssert::not_exists(project.path("dist/main.scss"));
}

#[test]
fn test_bundle_from_config_file() {
    let project = create_project();
    project
        .write_config(
            r#"
entries = ["src/main.scss", "src/admin.scss"]
out_dir = "build"
dedupe_globs = ["src/_base.scss"]
max_parallel = 1
"#,
        )
        .unwrap();

    project.run(&["--quiet", "bundle"]).unwrap().assert_success();

    // Entries run one at a time in order, so main sees base first.
    FileAssert::equals(project.path("build/main.scss"), "body { margin: 0; }\n\n.main {}\n");
    FileAssert::equals(project.path("build/admin.scss"), "\n.admin {}\n");
}

#[test]
fn test_cli_entries_override_config_entries() {
    let project = create_project();
    project.write_config("entries = [\"src/main.scss\"]\nout_dir = \"build\"\n").unwrap();

    project.run(&["bundle", "src/admin.scss"]).unwrap().assert_success();

    FileAssert::exists(project.path("build/admin.scss"));
    FileAssert::not_exists(project.path("build/main.scss"));
}

#[test]
fn test_invalid_config_file_reports_parse_error() {
    let project = create_project();
    project.write_config("entries = [\"src/main.scss\"\n").unwrap();

    project
        .run(&["bundle"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid configuration file syntax");
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let project = create_project();
    project.write_config("entries = [\"src/main.scss\"]\nwatch = true\n").unwrap();

    project.run(&["bundle"]).unwrap().assert_failure();
}

#[test]
fn test_no_entries_is_an_error() {
    let project = create_project();

    project
        .run(&["bundle"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("No entry files to bundle");
}

#[test]
fn test_missing_entry_fails_after_writing_others() {
    let project = create_project();

    project
        .run(&["bundle", "src/main.scss", "src/gone.scss", "--out-dir", "dist"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Entry file not found");

    FileAssert::exists(project.path("dist/main.scss"));
    FileAssert::not_exists(project.path("dist/gone.scss"));
}

#[test]
fn test_invalid_dedupe_glob_fails() {
    let project = create_project();

    project
        .run(&["bundle", "src/main.scss", "--dedupe", "src/[*.scss"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid dedupe glob pattern");
}

#[test]
fn test_invalid_ignore_pattern_fails() {
    let project = create_project();

    project
        .run(&["bundle", "src/main.scss", "--ignore-import", "("])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid ignore-import pattern");
}

#[test]
fn test_unresolved_import_marker_in_output() {
    let project = TestProject::new().unwrap();
    project.write("a.scss", "@import 'missing';\n.a {}").unwrap();

    project
        .run(&["bundle", "a.scss"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("IMPORTED FILE NOT FOUND")
        .assert_stdout_contains("@import 'missing';");
}

#[test]
fn test_tree_text_format() {
    let project = create_project();
    project.write("src/extra.scss", "@import 'nope';").unwrap();

    Command::new(env!("CARGO_BIN_EXE_scss-bundler"))
        .args(["tree", "src/main.scss", "src/extra.scss", "--dedupe", "src/_base.scss", "-f", "text"])
        .current_dir(project.root())
        .env("NO_COLOR", "1")
        .env("SCSS_BUNDLER_NO_PROGRESS", "1")
        .assert()
        .success()
        .stdout(
            "src/main.scss\n  src/_base.scss\n  src/_base.scss (deduped)\nsrc/extra.scss\n  src/nope.scss (not found)\n",
        );
}

#[test]
fn test_tree_default_format_uses_connectors() {
    let project = create_project();

    Command::new(env!("CARGO_BIN_EXE_scss-bundler"))
        .args(["tree", "src/main.scss"])
        .current_dir(project.root())
        .env("NO_COLOR", "1")
        .env("SCSS_BUNDLER_NO_PROGRESS", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("├── src/_base.scss"))
        .stdout(predicate::str::contains("└── src/_base.scss"));
}

#[test]
fn test_tree_json_format() {
    let project = create_project();

    let output = project.run(&["tree", "src/main.scss", "--format", "json"]).unwrap();
    let output = output.assert_success().stdout.clone();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    let entry = &json["entries"][0];
    assert_eq!(entry["found"], true);
    assert!(entry.get("content").is_none());
    assert_eq!(entry["imports"].as_array().unwrap().len(), 2);
}

#[test]
fn test_tree_rejects_unknown_format() {
    let project = create_project();

    project
        .run(&["tree", "src/main.scss", "--format", "yaml"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid format");
}

#[test]
fn test_tree_does_not_write_files() {
    let project = create_project();
    project.write_config("entries = [\"src/main.scss\"]\nout_dir = \"dist\"\n").unwrap();

    project.run(&["tree"]).unwrap().assert_success();

    FileAssert::not_exists(project.path("dist/main.scss"));
}

#[test]
fn test_help_lists_commands() {
    Command::new(env!("CARGO_BIN_EXE_scss-bundler"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle"))
        .stdout(predicate::str::contains("tree"));
}
