use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forge::request::{
    Branch, ContentEntry, ContentKind, ObjectKind, PullRequest, Repository,
};

#[derive(Debug, Deserialize)]
pub struct GithubAccount {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubRepository {
    pub name: String,
    pub full_name: String,
    pub owner: GithubAccount,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub description: Option<String>,
    pub html_url: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GithubRepository> for Repository {
    fn from(repo: GithubRepository) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.login,
            default_branch: repo.default_branch.unwrap_or_else(|| "main".into()),
            private: repo.private,
            description: repo.description,
            html_url: repo.html_url,
            updated_at: repo.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRepo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    pub auto_init: bool,
}

#[derive(Debug, Serialize)]
pub struct EditRepo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubContent {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Option<String>,
    pub encoding: Option<String>,
    pub download_url: Option<String>,
}

impl GithubContent {
    pub fn content_kind(&self) -> ContentKind {
        match self.kind.as_str() {
            "dir" => ContentKind::Dir,
            "symlink" => ContentKind::Symlink,
            "submodule" => ContentKind::Submodule,
            _ => ContentKind::File,
        }
    }
}

impl From<GithubContent> for ContentEntry {
    fn from(content: GithubContent) -> Self {
        let kind = content.content_kind();
        Self {
            name: content.name,
            path: content.path,
            sha: content.sha,
            size: content.size,
            kind,
            download_url: content.download_url,
        }
    }
}

/// The contents endpoint returns an array for directories and a single
/// object for anything else.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GithubContents {
    Listing(Vec<GithubContent>),
    Single(Box<GithubContent>),
}

#[derive(Debug, Deserialize)]
pub struct GithubBlob {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PutFileBody {
    pub message: String,
    /// Base64 encoded file content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteFileBody {
    pub message: String,
    pub sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShaOnly {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct PathAndSha {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubFileCommit {
    pub content: Option<PathAndSha>,
    pub commit: ShaOnly,
}

#[derive(Debug, Deserialize)]
pub struct GithubRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: ShaOnly,
}

#[derive(Debug, Serialize)]
pub struct CreateRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateRef {
    pub sha: String,
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct GithubCommit {
    pub sha: String,
    pub tree: ShaOnly,
}

#[derive(Debug, Deserialize)]
pub struct GithubTreeItem {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubTree {
    pub sha: String,
    pub tree: Vec<GithubTreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Serialize)]
pub struct GithubTreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTree {
    pub tree: Vec<GithubTreeEntry>,
}

#[derive(Debug, Serialize)]
pub struct CreateCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubBranch {
    pub name: String,
    pub commit: ShaOnly,
    #[serde(default)]
    pub protected: bool,
}

impl From<GithubBranch> for Branch {
    fn from(branch: GithubBranch) -> Self {
        Self {
            name: branch.name,
            sha: branch.commit.sha,
            protected: branch.protected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GithubPullRef {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubPullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub head: GithubPullRef,
    pub base: GithubPullRef,
}

impl From<GithubPullRequest> for PullRequest {
    fn from(pr: GithubPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            state: pr.state,
            html_url: pr.html_url,
            head: pr.head.name,
            base: pr.base.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePull {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubErrorDetail {
    pub message: Option<String>,
    pub code: Option<String>,
    pub field: Option<String>,
}

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
pub struct GithubError {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<GithubErrorDetail>,
}

impl GithubError {
    /// Top level message followed by any detail messages.
    pub fn describe(&self) -> String {
        let details = self
            .errors
            .iter()
            .filter_map(|e| {
                e.message.clone().or_else(|| match (&e.field, &e.code) {
                    (Some(field), Some(code)) => Some(format!("{field} {code}")),
                    _ => None,
                })
            })
            .collect::<Vec<String>>();

        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, details.join("; "))
        }
    }
}
