//! Common test utilities for bw integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway repository directory
pub struct TestRepo {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the repository root
    pub path: PathBuf,
}

impl TestRepo {
    /// Create an empty repository with an empty nodes.yaml
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let repo = Self { temp, path };
        repo.write_file("nodes.yaml", "{}\n");
        repo
    }

    /// Write a file in the repository
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    pub fn nodes(&self, yaml: &str) -> &Self {
        self.write_file("nodes.yaml", yaml);
        self
    }

    pub fn groups(&self, yaml: &str) -> &Self {
        self.write_file("groups.yaml", yaml);
        self
    }

    /// Write `bundles/<name>/items.yaml`
    pub fn bundle(&self, name: &str, items_yaml: &str) -> &Self {
        self.write_file(&format!("bundles/{name}/items.yaml"), items_yaml);
        self
    }

    /// A scratch directory outside the repository, for items to manage
    #[allow(dead_code)]
    pub fn target_dir(&self) -> PathBuf {
        let dir = self.path.join("target-root");
        std::fs::create_dir_all(&dir).expect("Failed to create target directory");
        dir
    }

    /// `bw` invocation with this repository passed via `--repo`
    pub fn bw(&self) -> Command {
        let mut cmd = bw_cmd();
        cmd.arg("--repo").arg(&self.path);
        cmd
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// `bw` binary with developer overrides removed
#[allow(deprecated)]
pub fn bw_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bw").expect("bw binary");
    // Always ignore any developer BW_REPO_PATH overrides during tests
    cmd.env_remove("BW_REPO_PATH");
    cmd.env_remove("RUST_LOG");
    cmd
}
