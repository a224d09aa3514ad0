//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A working clone of a bare `origin` repository, both in a temp dir.
pub struct GitFixture {
    dir: TempDir,
    work: PathBuf,
}

impl GitFixture {
    /// Create `origin.git` and a clone with one commit on `master`.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "--bare", "-q", "origin.git"]);
        git(dir.path(), &["clone", "-q", "origin.git", "work"]);

        let fixture = Self { work: dir.path().join("work"), dir };
        fixture.commit("packages/kernel.c", "int main(void) { return 0; }\n", "Initial commit");
        fixture.commit("tools/build.py", "print('build')\n", "Add build tool");
        fixture.git(&["push", "-q", "origin", "master"]);
        fixture
    }

    /// Working tree of the clone.
    pub fn work(&self) -> &Path {
        &self.work
    }

    /// Run git in the clone.
    pub fn git(&self, args: &[&str]) -> String {
        git(&self.work, args)
    }

    /// Write a file and commit it.
    pub fn commit(&self, path: &str, content: &str, message: &str) {
        let file = self.work.join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, content).unwrap();
        self.git(&["add", path]);
        self.git(&["commit", "-q", "-m", message]);
    }

    /// Start a task branch from `master`.
    pub fn start_branch(&self, name: &str) {
        self.git(&["checkout", "-q", "-b", name, "master"]);
    }

    /// Push a branch and return to `master`.
    pub fn publish(&self, name: &str) {
        self.git(&["push", "-q", "origin", name]);
        self.git(&["checkout", "-q", "master"]);
    }

    /// Commit a review by `reviewer` into the review record of `branch`.
    pub fn review(&self, branch: &str, reviewer: &str, conclusion: &str) {
        let content = format!(
            "RTOS Task Review\n=======================\n\nTask name: {branch}\nReviewer: {reviewer} ({reviewer}@example.com)\nConclusion: {conclusion}\n"
        );
        self.commit(
            &format!("pm/reviews/{branch}/review-{reviewer}.md"),
            &content,
            &format!("Review {branch}"),
        );
    }
}

/// Run git with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(["-c", "init.defaultBranch=master", "-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
