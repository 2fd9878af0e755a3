use futures_util::future::join_all;
use log::*;
use serde::Serialize;

use crate::forge::{
    request::{PutFileRequest, RepoId},
    traits::Forge,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    pub repo: RepoId,
    pub branch: Option<String>,
    /// Shared commit message; each file gets `Upload <path>` when absent.
    pub message: Option<String>,
    pub files: Vec<UploadFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub results: Vec<UploadResult>,
    pub summary: UploadSummary,
}

/// Create every file of the batch concurrently. Results come back in input
/// order and a failed write never stops the others.
pub async fn upload_batch(forge: &dyn Forge, batch: UploadBatch) -> UploadReport {
    let UploadBatch {
        repo,
        branch,
        message,
        files,
    } = batch;

    let writes = files.into_iter().map(|file| {
        let UploadFile { path, content } = file;
        let message = message
            .clone()
            .unwrap_or_else(|| format!("Upload {path}"));
        let req = PutFileRequest {
            repo: repo.clone(),
            path: path.clone(),
            content,
            message,
            branch: branch.clone(),
            sha: None,
        };

        async move {
            match forge.put_file(req).await {
                Ok(commit) => UploadResult {
                    path,
                    success: true,
                    sha: commit.sha,
                    error: None,
                },
                Err(err) => {
                    error!("failed to upload {path}: {err}");
                    UploadResult {
                        path,
                        success: false,
                        sha: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        }
    });

    let results = join_all(writes).await;

    let successful = results.iter().filter(|r| r.success).count();
    let summary = UploadSummary {
        total: results.len(),
        successful,
        failed: results.len() - successful,
    };

    info!(
        "uploaded {}/{} files to {}",
        summary.successful, summary.total, repo
    );

    UploadReport { results, summary }
}
