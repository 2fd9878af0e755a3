use log::*;

use crate::{
    Result,
    error::RepodeskError,
    forge::{
        request::{
            CreateCommitRequest, CreateTreeRequest, GitCommit, RepoId,
            TreeEntry, UpdateRefRequest,
        },
        traits::Forge,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDirectoryRequest {
    pub repo: RepoId,
    pub branch: String,
    pub path: String,
    pub message: String,
}

/// True when `path` is `prefix` itself or nested below it.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Split tree entries into those kept and those at or under `prefix`.
pub fn prune_tree(
    entries: Vec<TreeEntry>,
    prefix: &str,
) -> (Vec<TreeEntry>, Vec<TreeEntry>) {
    entries
        .into_iter()
        .partition(|entry| !is_under(&entry.path, prefix))
}

/// Delete a directory by committing a copy of the branch tree without it.
///
/// Returns the new commit, or `None` when nothing lives under the path.
/// The ref update is a fast-forward, so a concurrent push to the branch
/// makes this fail rather than discard the other commit.
pub async fn delete_directory(
    forge: &dyn Forge,
    req: DeleteDirectoryRequest,
) -> Result<Option<GitCommit>> {
    let tip = forge
        .get_branch_ref(req.repo.clone(), req.branch.clone())
        .await?
        .ok_or_else(|| {
            RepodeskError::not_found(format!("Branch not found: {}", req.branch))
        })?;

    let commit = forge.get_commit(req.repo.clone(), tip.sha.clone()).await?;
    let tree = forge
        .get_tree(req.repo.clone(), commit.tree_sha.clone())
        .await?;

    if tree.truncated {
        return Err(RepodeskError::bad_request(format!(
            "Repository tree is too large to rewrite; cannot delete {}",
            req.path
        )));
    }

    let (kept, removed) = prune_tree(tree.entries, &req.path);

    if removed.is_empty() {
        info!("nothing under {} in {}@{}", req.path, req.repo, req.branch);
        return Ok(None);
    }

    debug!(
        "removing {} entries under {} from {}",
        removed.len(),
        req.path,
        req.repo
    );

    let tree_sha = forge
        .create_tree(CreateTreeRequest {
            repo: req.repo.clone(),
            entries: kept,
        })
        .await?;

    let new_commit = forge
        .create_commit(CreateCommitRequest {
            repo: req.repo.clone(),
            message: req.message,
            tree_sha,
            parents: vec![tip.sha],
        })
        .await?;

    forge
        .update_ref(UpdateRefRequest {
            repo: req.repo.clone(),
            branch: req.branch,
            sha: new_commit.sha.clone(),
            force: false,
        })
        .await?;

    info!("deleted {} from {} in {}", req.path, req.repo, new_commit.sha);

    Ok(Some(new_commit))
}
