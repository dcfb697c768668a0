//! Common test utilities for scss-bundler integration tests
//!
//! Wraps [`ProjectFixture`] with a binary runner and a few file assertions.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use scss_bundler::bundler::{BundleOptions, Bundler};
use scss_bundler::test_utils::ProjectFixture;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A stylesheet project on disk plus helpers to run the binary inside it.
pub struct TestProject {
    fixture: ProjectFixture,
}

impl TestProject {
    /// Create an empty project
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: ProjectFixture::new()?,
        })
    }

    /// Project root (canonical, absolute)
    pub fn root(&self) -> &Path {
        self.fixture.root()
    }

    /// Absolute path of a project-relative file
    pub fn path(&self, relative: &str) -> PathBuf {
        self.fixture.path(relative)
    }

    /// Write a stylesheet (or any file), creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        self.fixture.write(relative, content)
    }

    /// Write `scss-bundler.toml` at the project root
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        self.fixture.write("scss-bundler.toml", content)
    }

    /// Read a project file back
    pub fn read(&self, relative: &str) -> Result<String> {
        self.fixture.read(relative)
    }

    /// A bundler rooted at the project directory
    pub fn bundler(&self) -> Bundler {
        Bundler::new(BundleOptions::new(self.root()))
    }

    /// Run the scss-bundler binary in the project directory
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_scss-bundler");
        let output = Command::new(binary)
            .args(args)
            .current_dir(self.root())
            .env("NO_COLOR", "1")
            .env("SCSS_BUNDLER_NO_PROGRESS", "1")
            .env_remove("RUST_LOG")
            .output()
            .context("Failed to run scss-bundler")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Captured result of one binary run
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert_eq!(
            self.code,
            Some(1),
            "Expected exit code 1\nStdout: {}\nStderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file has exact content
    pub fn equals(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert_eq!(content, expected, "File {} content mismatch", path.display());
    }
}
