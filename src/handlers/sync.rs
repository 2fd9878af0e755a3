//! Handler for syncing one repository into another.
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    handlers::AppState,
    validation::{Validate, Validator},
    workflow::{SyncOperation, sync_tree},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncReposBody {
    pub source_repo: String,
    pub dest_repo: String,
    pub source_branch: Option<String>,
    pub dest_branch: Option<String>,
}

impl Validate for SyncReposBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.repo_name("sourceRepo", &self.source_repo)
            .repo_name("destRepo", &self.dest_repo)
            .branch("sourceBranch", self.source_branch.as_deref())
            .branch("destBranch", self.dest_branch.as_deref())
            .check(
                "destRepo",
                self.source_repo != self.dest_repo
                    || self.source_branch != self.dest_branch,
                "must differ from sourceRepo unless the branches differ",
            );
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Synced {
    success: bool,
    files_synced: usize,
    total_files: usize,
    failed: usize,
    source_branch: String,
    dest_branch: String,
}

/// POST /api/sync-repos
///
/// Copies the source repository's files onto the destination branch. Both
/// repositories are looked up under the caller's account.
pub async fn sync_repos(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SyncReposBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (credential, forge) = state.caller_forge(&req).await?;

    let op = SyncOperation {
        account: credential.account,
        source_repo: body.source_repo,
        dest_repo: body.dest_repo,
        source_branch: body.source_branch,
        dest_branch: body.dest_branch,
    };

    let summary =
        sync_tree(forge.as_ref(), &op, state.limits.sync_max_files).await?;

    Ok(HttpResponse::Ok().json(Synced {
        success: true,
        files_synced: summary.files_synced,
        total_files: summary.total_files,
        failed: summary.failed,
        source_branch: summary.source_branch,
        dest_branch: summary.dest_branch,
    }))
}
