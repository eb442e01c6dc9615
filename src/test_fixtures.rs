//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides helpers to create temp directories, small
//! repositories and a recording [`FakeRunner`] with a single call.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, FakeRunner, RepoBuilder};
//!
//! #[test]
//! fn my_test() {
//!     let temp = create_temp_dir();
//!
//!     let (temp, repo) = RepoBuilder::new()
//!         .nodes("node1: {}\n")
//!         .bundle("base", "pkg_apt:\n  htop:\n")
//!         .open();
//!
//!     let runner = FakeRunner::new().respond("dpkg -s", 1, "");
//! }
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::cell::RefCell;
use std::path::Path;

use tempfile::TempDir;

use crate::error::Result;
use crate::node::{CommandRunner, RunResult};
use crate::repo::Repository;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create test files in a directory.
///
/// Takes a list of (path, content) tuples and creates those files.
/// Paths are relative to the provided base directory.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(base: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = base.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// Builds a repository directory from YAML snippets
#[derive(Debug, Default)]
pub struct RepoBuilder {
    nodes: String,
    groups: Option<String>,
    files: Vec<(String, String)>,
}

impl RepoBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn nodes(mut self, yaml: &str) -> Self {
        self.nodes = yaml.to_string();
        self
    }

    #[must_use]
    pub fn groups(mut self, yaml: &str) -> Self {
        self.groups = Some(yaml.to_string());
        self
    }

    /// Add `bundles/<name>/items.yaml`
    #[must_use]
    pub fn bundle(mut self, name: &str, items_yaml: &str) -> Self {
        self.files
            .push((format!("bundles/{name}/items.yaml"), items_yaml.to_string()));
        self
    }

    /// Add an arbitrary file relative to the repository root
    #[must_use]
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Write the repository into a fresh temp directory
    ///
    /// # Panics
    ///
    /// Panics if any file cannot be written.
    #[must_use]
    pub fn build(self) -> TempDir {
        let temp = create_temp_dir();
        let mut files = vec![("nodes.yaml".to_string(), self.nodes)];
        if let Some(groups) = self.groups {
            files.push(("groups.yaml".to_string(), groups));
        }
        files.extend(self.files);

        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
            .collect();
        create_test_files(temp.path(), &borrowed);
        temp
    }

    /// Write and open the repository
    ///
    /// # Panics
    ///
    /// Panics if the repository cannot be opened.
    #[must_use]
    pub fn open(self) -> (TempDir, Repository) {
        let temp = self.build();
        let repo = Repository::open(temp.path()).expect("Failed to open repository");
        (temp, repo)
    }
}

/// Runner that records commands and answers from canned responses
///
/// A response matches when the command starts with its prefix; the most
/// recently added match wins. Unmatched commands succeed with empty output.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: Vec<(String, RunResult)>,
    commands: RefCell<Vec<String>>,
    inputs: RefCell<Vec<Vec<u8>>>,
}

impl FakeRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix`
    #[must_use]
    pub fn respond(mut self, prefix: &str, return_code: i32, stdout: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            RunResult {
                return_code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        ));
        self
    }

    /// Commands executed so far
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Stdin payloads passed so far
    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs.borrow().clone()
    }

    /// Whether any executed command starts with `prefix`
    pub fn ran(&self, prefix: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for FakeRunner {
    fn node_name(&self) -> &str {
        "fake"
    }

    fn execute(&self, command: &str, input: Option<&[u8]>) -> Result<RunResult> {
        self.commands.borrow_mut().push(command.to_string());
        if let Some(input) = input {
            self.inputs.borrow_mut().push(input.to_vec());
        }
        Ok(self
            .responses
            .iter()
            .rev()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_create_test_files() {
        let temp = create_temp_dir();
        create_test_files(temp.path(), &[("a/b.txt", "content")]);
        let content = std::fs::read_to_string(temp.path().join("a/b.txt")).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_repo_builder() {
        let temp = RepoBuilder::new()
            .nodes("node1: {}\n")
            .bundle("base", "")
            .build();
        assert!(temp.path().join("nodes.yaml").exists());
        assert!(temp.path().join("bundles/base/items.yaml").exists());
        assert!(!temp.path().join("groups.yaml").exists());
    }

    #[test]
    fn test_fake_runner_records_and_responds() {
        let runner = FakeRunner::new()
            .respond("dpkg", 1, "")
            .respond("dpkg -s htop", 0, "ok");
        assert_eq!(runner.run_may_fail("dpkg -s vim").unwrap().return_code, 1);
        assert_eq!(runner.run("dpkg -s htop").unwrap().stdout, "ok");
        assert!(runner.run("true").unwrap().success());
        assert_eq!(runner.commands().len(), 3);
        assert!(runner.ran("dpkg -s vim"));
    }
}
