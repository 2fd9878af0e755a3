use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Owner and name of a repository.
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Normalized repository metadata.
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub default_branch: String,
    pub private: bool,
    pub description: Option<String>,
    pub html_url: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of object referenced by a tree entry.
pub enum ObjectKind {
    Blob,
    Tree,
    /// Submodule pointer.
    Commit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One node of a repository tree at a given revision.
pub struct TreeEntry {
    /// Repo-relative path, no leading slash.
    pub path: String,
    pub kind: ObjectKind,
    pub sha: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Snapshot listing of a tree.
pub struct Tree {
    pub sha: String,
    pub entries: Vec<TreeEntry>,
    /// Set when the upstream listing was cut short.
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of a directory listing entry.
pub enum ContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Entry of a directory listing.
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded file content with its blob sha.
pub struct FileContent {
    pub path: String,
    pub sha: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to list a directory.
pub struct ListContentsRequest {
    pub repo: RepoId,
    /// Empty for the repository root.
    pub path: String,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to read a single file.
pub struct GetFileRequest {
    pub repo: RepoId,
    pub path: String,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create or update a single file.
pub struct PutFileRequest {
    pub repo: RepoId,
    pub path: String,
    /// Raw bytes, base64 encoded on the wire.
    pub content: Vec<u8>,
    pub message: String,
    pub branch: Option<String>,
    /// Current blob sha of the file being overwritten. `None` creates.
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Result of a file write.
pub struct FileCommit {
    pub path: String,
    /// New blob sha of the written file.
    pub sha: Option<String>,
    pub commit_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to delete a single file.
pub struct DeleteFileRequest {
    pub repo: RepoId,
    pub path: String,
    pub sha: String,
    pub message: String,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A branch ref and the commit it points to.
pub struct GitRef {
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommit {
    pub sha: String,
    pub tree_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a branch pointing at `sha`.
pub struct CreateRefRequest {
    pub repo: RepoId,
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to move a branch to `sha`.
pub struct UpdateRefRequest {
    pub repo: RepoId,
    pub branch: String,
    pub sha: String,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a complete tree (no base tree).
pub struct CreateTreeRequest {
    pub repo: RepoId,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommitRequest {
    pub repo: RepoId,
    pub message: String,
    pub tree_sha: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    pub sha: String,
    pub protected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    #[default]
    Open,
    Closed,
    All,
}

impl PullState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullState::Open => "open",
            PullState::Closed => "closed",
            PullState::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPullsRequest {
    pub repo: RepoId,
    pub state: PullState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to open a pull request.
pub struct CreatePrRequest {
    pub repo: RepoId,
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Normalized pull request information.
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a repository under the caller's account.
pub struct CreateRepoRequest {
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
    pub auto_init: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Partial repository update; `None` fields are left untouched.
pub struct UpdateRepoRequest {
    pub repo: RepoId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub private: Option<bool>,
    pub default_branch: Option<String>,
}
