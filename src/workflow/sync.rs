use futures_util::future::try_join;
use log::*;
use serde::Serialize;

use crate::{
    Result,
    error::RepodeskError,
    forge::{
        request::{
            CreateRefRequest, GetFileRequest, ObjectKind, PutFileRequest,
            RepoId, Repository, TreeEntry,
        },
        traits::Forge,
    },
};

/// Copy the files of one of the caller's repositories into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOperation {
    /// Caller's account; both repositories live under it.
    pub account: String,
    pub source_repo: String,
    pub dest_repo: String,
    /// Defaults to the source repository's default branch.
    pub source_branch: Option<String>,
    /// Defaults to the destination repository's default branch. Created from
    /// the destination default branch when missing.
    pub dest_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub files_synced: usize,
    /// Number of files in the source tree, including any past the cap.
    pub total_files: usize,
    pub failed: usize,
    pub source_branch: String,
    pub dest_branch: String,
}

async fn owned_repo(
    forge: &dyn Forge,
    account: &str,
    name: &str,
) -> Result<Repository> {
    let id = RepoId::new(account, name);
    match forge.get_repo(id.clone()).await? {
        Some(repo) if repo.owner == account => Ok(repo),
        Some(repo) => {
            warn!("{id} resolved to a repository owned by {}", repo.owner);
            Err(RepodeskError::forbidden(format!(
                "You do not own repository {name}"
            )))
        }
        None => Err(RepodeskError::forbidden(format!(
            "Repository {name} not found or not owned by you"
        ))),
    }
}

/// Make sure `branch` exists in `repo`, branching it off `base` if needed.
async fn ensure_branch(
    forge: &dyn Forge,
    repo: &RepoId,
    branch: &str,
    base: &str,
) -> Result<()> {
    if forge
        .get_branch_ref(repo.clone(), branch.to_string())
        .await?
        .is_some()
    {
        return Ok(());
    }

    let tip = forge
        .get_branch_ref(repo.clone(), base.to_string())
        .await?
        .ok_or_else(|| {
            RepodeskError::not_found(format!("Base branch not found: {base}"))
        })?;

    info!("creating branch {branch} in {repo} from {base}");

    forge
        .create_ref(CreateRefRequest {
            repo: repo.clone(),
            branch: branch.to_string(),
            sha: tip.sha,
        })
        .await?;

    Ok(())
}

/// Create or update one destination file from the source.
async fn sync_file(
    forge: &dyn Forge,
    source: &RepoId,
    source_branch: &str,
    dest: &RepoId,
    dest_branch: &str,
    entry: &TreeEntry,
) -> Result<()> {
    let file = forge
        .get_file(GetFileRequest {
            repo: source.clone(),
            path: entry.path.clone(),
            branch: Some(source_branch.to_string()),
        })
        .await?
        .ok_or_else(|| {
            RepodeskError::not_found(format!(
                "{} disappeared from {source}",
                entry.path
            ))
        })?;

    let existing = forge
        .get_file(GetFileRequest {
            repo: dest.clone(),
            path: entry.path.clone(),
            branch: Some(dest_branch.to_string()),
        })
        .await?;

    forge
        .put_file(PutFileRequest {
            repo: dest.clone(),
            path: entry.path.clone(),
            content: file.content,
            message: format!("Sync {} from {source}", entry.path),
            branch: Some(dest_branch.to_string()),
            sha: existing.map(|f| f.sha),
        })
        .await?;

    Ok(())
}

/// Copy up to `limit` files of the source branch onto the destination
/// branch, overwriting files that already exist there.
///
/// Ownership and branch setup failures abort before anything is written.
/// Failures on individual files are logged and counted.
pub async fn sync_tree(
    forge: &dyn Forge,
    op: &SyncOperation,
    limit: usize,
) -> Result<SyncSummary> {
    let (source, dest) = try_join(
        owned_repo(forge, &op.account, &op.source_repo),
        owned_repo(forge, &op.account, &op.dest_repo),
    )
    .await?;

    let source_id = RepoId::new(&op.account, &source.name);
    let dest_id = RepoId::new(&op.account, &dest.name);

    let source_branch = op
        .source_branch
        .clone()
        .unwrap_or_else(|| source.default_branch.clone());
    let dest_branch = op
        .dest_branch
        .clone()
        .unwrap_or_else(|| dest.default_branch.clone());

    if source.name == dest.name && source_branch == dest_branch {
        return Err(RepodeskError::bad_request(format!(
            "Cannot sync {source_id}@{source_branch} onto itself"
        )));
    }

    ensure_branch(forge, &dest_id, &dest_branch, &dest.default_branch)
        .await
        .map_err(|err| {
            RepodeskError::bad_request(format!(
                "Failed to create branch {dest_branch}: {err}"
            ))
        })?;

    let tree = forge
        .get_tree(source_id.clone(), source_branch.clone())
        .await?;

    let blobs = tree
        .entries
        .into_iter()
        .filter(|entry| entry.kind == ObjectKind::Blob)
        .collect::<Vec<TreeEntry>>();

    let total_files = blobs.len();

    if total_files > limit {
        warn!(
            "{source_id} has {total_files} files; only the first {limit} will be synced"
        );
    }

    let mut files_synced = 0;
    let mut failed = 0;

    for entry in blobs.iter().take(limit) {
        match sync_file(
            forge,
            &source_id,
            &source_branch,
            &dest_id,
            &dest_branch,
            entry,
        )
        .await
        {
            Ok(()) => {
                debug!("synced {}", entry.path);
                files_synced += 1;
            }
            Err(err) => {
                error!("failed to sync {}: {err}", entry.path);
                failed += 1;
            }
        }
    }

    info!(
        "synced {files_synced}/{total_files} files from {source_id}@{source_branch} to {dest_id}@{dest_branch}"
    );

    Ok(SyncSummary {
        files_synced,
        total_files,
        failed,
        source_branch,
        dest_branch,
    })
}
