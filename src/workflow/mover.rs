use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::RepodeskError,
    forge::{
        request::{DeleteFileRequest, GetFileRequest, PutFileRequest, RepoId},
        traits::Forge,
    },
};

/// Kind of an item selected for a batch move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    File,
    Dir,
}

/// A single move of one file inside a repository branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEntryRequest {
    pub repo: RepoId,
    pub branch: Option<String>,
    pub from: String,
    pub to: String,
    /// Last known blob sha of `from`, used for the delete.
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEntryOutcome {
    pub to: String,
    /// False when the copy landed but the original could not be deleted.
    pub source_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveItem {
    pub path: String,
    pub sha: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveBatch {
    pub repo: RepoId,
    pub branch: Option<String>,
    /// Target directory; empty means the repository root.
    pub destination: String,
    pub items: Vec<MoveItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub moved: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Final path component of a repository path.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Join a directory and a file name, treating an empty directory as the
/// repository root.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Copy `from` to `to`, then delete `from`.
///
/// Read and write failures are returned and leave the original untouched. A
/// failed delete only logs: the caller ends up with the file at both paths.
pub async fn move_entry(
    forge: &dyn Forge,
    req: &MoveEntryRequest,
) -> Result<MoveEntryOutcome> {
    let source = forge
        .get_file(GetFileRequest {
            repo: req.repo.clone(),
            path: req.from.clone(),
            branch: req.branch.clone(),
        })
        .await?
        .ok_or_else(|| {
            RepodeskError::not_found(format!("File not found: {}", req.from))
        })?;

    let message = format!("Move {} to {}", req.from, req.to);

    forge
        .put_file(PutFileRequest {
            repo: req.repo.clone(),
            path: req.to.clone(),
            content: source.content,
            message: message.clone(),
            branch: req.branch.clone(),
            sha: None,
        })
        .await?;

    debug!("copied {} to {} in {}", req.from, req.to, req.repo);

    let deleted = forge
        .delete_file(DeleteFileRequest {
            repo: req.repo.clone(),
            path: req.from.clone(),
            sha: req.sha.clone(),
            message,
            branch: req.branch.clone(),
        })
        .await;

    let source_removed = match deleted {
        Ok(()) => true,
        Err(err) => {
            warn!(
                "copied {} to {} but failed to delete the original: {err}",
                req.from, req.to
            );
            false
        }
    };

    Ok(MoveEntryOutcome {
        to: req.to.clone(),
        source_removed,
    })
}

/// Move every file item into `destination`, one at a time and in order.
pub async fn move_batch(forge: &dyn Forge, batch: MoveBatch) -> MoveReport {
    let mut report = MoveReport::default();

    for item in batch.items {
        if item.kind == EntryKind::Dir {
            info!("skipping directory {} in move batch", item.path);
            report.skipped += 1;
            continue;
        }

        let to = join_path(&batch.destination, basename(&item.path));

        if to == item.path {
            debug!("{} is already in {}", item.path, batch.destination);
            report.skipped += 1;
            continue;
        }

        let req = MoveEntryRequest {
            repo: batch.repo.clone(),
            branch: batch.branch.clone(),
            from: item.path,
            to,
            sha: item.sha,
        };

        match move_entry(forge, &req).await {
            Ok(_) => report.moved += 1,
            Err(err) => {
                error!("failed to move {} to {}: {err}", req.from, req.to);
                report.failed += 1;
            }
        }
    }

    info!(
        "move batch in {}: {} moved, {} failed, {} skipped",
        batch.repo, report.moved, report.failed, report.skipped
    );

    report
}
