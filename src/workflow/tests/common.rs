//! Fixtures shared by the workflow tests.
use crate::forge::request::{
    FileCommit, FileContent, ObjectKind, Repository, TreeEntry,
};

pub const ACCOUNT: &str = "octocat";

pub fn repository(owner: &str, name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        owner: owner.to_string(),
        default_branch: "main".to_string(),
        private: false,
        description: None,
        html_url: format!("https://github.com/{owner}/{name}"),
        updated_at: None,
    }
}

pub fn file(path: &str, sha: &str, content: &str) -> FileContent {
    FileContent {
        path: path.to_string(),
        sha: sha.to_string(),
        content: content.as_bytes().to_vec(),
    }
}

pub fn blob(path: &str, sha: &str) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        kind: ObjectKind::Blob,
        sha: sha.to_string(),
        mode: "100644".to_string(),
    }
}

pub fn subtree(path: &str, sha: &str) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        kind: ObjectKind::Tree,
        sha: sha.to_string(),
        mode: "040000".to_string(),
    }
}

pub fn written(path: &str) -> FileCommit {
    FileCommit {
        path: path.to_string(),
        sha: Some(format!("sha-of-{path}")),
        commit_sha: "commit-sha".to_string(),
    }
}
