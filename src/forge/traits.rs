//! Traits related to the upstream repository host
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{
        Branch, ContentEntry, CreateCommitRequest, CreatePrRequest,
        CreateRefRequest, CreateRepoRequest, CreateTreeRequest,
        DeleteFileRequest, FileCommit, FileContent, GetFileRequest, GitCommit,
        GitRef, ListContentsRequest, ListPullsRequest, PullRequest,
        PutFileRequest, RepoId, Repository, Tree, UpdateRefRequest,
        UpdateRepoRequest,
    },
};

/// One authenticated connection to the upstream host.
///
/// Every method maps to a single upstream request (or a paginated series of
/// them for listings). Lookups that can legitimately miss return `Ok(None)`
/// instead of an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    async fn get_repo(&self, repo: RepoId) -> Result<Option<Repository>>;
    /// Repositories owned by the authenticated account.
    async fn list_repos(&self) -> Result<Vec<Repository>>;
    async fn create_repo(&self, req: CreateRepoRequest) -> Result<Repository>;
    async fn update_repo(&self, req: UpdateRepoRequest) -> Result<Repository>;
    async fn delete_repo(&self, repo: RepoId) -> Result<()>;

    async fn list_contents(
        &self,
        req: ListContentsRequest,
    ) -> Result<Vec<ContentEntry>>;
    async fn get_file(&self, req: GetFileRequest)
    -> Result<Option<FileContent>>;
    async fn put_file(&self, req: PutFileRequest) -> Result<FileCommit>;
    async fn delete_file(&self, req: DeleteFileRequest) -> Result<()>;

    async fn get_branch_ref(
        &self,
        repo: RepoId,
        branch: String,
    ) -> Result<Option<GitRef>>;
    async fn create_ref(&self, req: CreateRefRequest) -> Result<GitRef>;
    async fn update_ref(&self, req: UpdateRefRequest) -> Result<GitRef>;
    async fn get_commit(&self, repo: RepoId, sha: String) -> Result<GitCommit>;
    /// Recursive tree listing. `tree_ish` is a tree sha, commit sha or
    /// branch name.
    async fn get_tree(&self, repo: RepoId, tree_ish: String) -> Result<Tree>;
    /// Create a tree; returns its sha.
    async fn create_tree(&self, req: CreateTreeRequest) -> Result<String>;
    async fn create_commit(&self, req: CreateCommitRequest)
    -> Result<GitCommit>;
    async fn list_branches(&self, repo: RepoId) -> Result<Vec<Branch>>;

    async fn list_pulls(&self, req: ListPullsRequest)
    -> Result<Vec<PullRequest>>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;

    async fn list_starred(&self) -> Result<Vec<Repository>>;
    async fn set_starred(&self, repo: RepoId, starred: bool) -> Result<()>;
}
