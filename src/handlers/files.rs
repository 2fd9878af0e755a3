//! Handlers for file and directory operations.
use actix_web::{HttpRequest, HttpResponse, web};
use base64::{Engine, prelude::BASE64_STANDARD};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::RepodeskError,
    forge::request::{
        ContentEntry, ContentKind, DeleteFileRequest, FileCommit,
        ListContentsRequest, PutFileRequest, RepoId,
    },
    handlers::AppState,
    validation::{MAX_UPLOAD_FILES, Validate, Validator},
    workflow::{
        DeleteDirectoryRequest, EntryKind, MoveBatch, MoveEntryRequest,
        MoveItem, UploadBatch, UploadFile, UploadResult, UploadSummary,
        delete_directory, move_batch, move_entry, upload_batch,
    },
};

/// How file content is carried in a request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ContentEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

impl ContentEncoding {
    pub fn decode(&self, content: &str) -> Result<Vec<u8>> {
        match self {
            ContentEncoding::Utf8 => Ok(content.as_bytes().to_vec()),
            ContentEncoding::Base64 => Ok(BASE64_STANDARD.decode(content)?),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateFileBody {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub content: String,
    pub encoding: ContentEncoding,
    pub message: Option<String>,
    pub branch: Option<String>,
    /// Blob sha of the file being replaced. Absent to create.
    pub sha: Option<String>,
}

impl Validate for CreateFileBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .path("path", &self.path)
            .check("path", !self.path.ends_with('/'), "must name a file")
            .branch("branch", self.branch.as_deref())
            .message("message", self.message.as_deref())
            .check(
                "content",
                self.encoding.decode(&self.content).is_ok(),
                "must be valid base64",
            );
        if let Some(sha) = &self.sha {
            v.sha("sha", sha);
        }
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct FileWritten {
    success: bool,
    data: FileCommit,
}

/// POST /api/create-file
///
/// Creates a file, or updates it when `sha` is given.
pub async fn create_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateFileBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;

    let content = body.encoding.decode(&body.content)?;
    let creating = body.sha.is_none();
    let message = body.message.unwrap_or_else(|| {
        if creating {
            format!("Create {}", body.path)
        } else {
            format!("Update {}", body.path)
        }
    });

    let commit = forge
        .put_file(PutFileRequest {
            repo: RepoId::new(&body.owner, &body.repo),
            path: body.path,
            content,
            message,
            branch: body.branch,
            sha: body.sha,
        })
        .await
        .map_err(|err| match err.upstream_status() {
            // GitHub answers a create over an existing file with 422
            Some(422) if creating => {
                RepodeskError::upstream(422, "File already exists")
            }
            _ => err,
        })?;

    Ok(HttpResponse::Ok().json(FileWritten {
        success: true,
        data: commit,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteFileBody {
    pub owner: String,
    pub repo: String,
    pub path: String,
    /// Required for files, ignored for directories.
    pub sha: Option<String>,
    pub branch: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Validate for DeleteFileBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .path("path", &self.path)
            .branch("branch", self.branch.as_deref())
            .message("message", self.message.as_deref());
        if self.kind == EntryKind::File {
            v.sha("sha", self.sha.as_deref().unwrap_or_default());
        }
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Deleted {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<String>,
}

/// POST /api/delete-file
///
/// Deletes a file, or a whole directory when `type` is `dir`.
pub async fn delete_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<DeleteFileBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;

    let repo = RepoId::new(&body.owner, &body.repo);
    let path = body.path.trim_end_matches('/').to_string();
    let message = body
        .message
        .unwrap_or_else(|| format!("Delete {path}"));

    if body.kind == EntryKind::Dir {
        let branch = match body.branch {
            Some(branch) => branch,
            None => {
                forge
                    .get_repo(repo.clone())
                    .await?
                    .ok_or_else(|| {
                        RepodeskError::not_found(format!(
                            "Repository not found: {repo}"
                        ))
                    })?
                    .default_branch
            }
        };

        let commit = delete_directory(
            forge.as_ref(),
            DeleteDirectoryRequest {
                repo,
                branch,
                path,
                message,
            },
        )
        .await?;

        return Ok(HttpResponse::Ok().json(Deleted {
            success: true,
            commit: commit.map(|c| c.sha),
        }));
    }

    forge
        .delete_file(DeleteFileRequest {
            repo,
            path,
            sha: body.sha.unwrap_or_default(),
            message,
            branch: body.branch,
        })
        .await?;

    Ok(HttpResponse::Ok().json(Deleted {
        success: true,
        commit: None,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameFileBody {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub new_path: String,
    pub sha: String,
    pub branch: String,
}

impl Validate for RenameFileBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .path("path", &self.path)
            .path("new_path", &self.new_path)
            .check(
                "new_path",
                self.new_path.is_empty() || self.new_path != self.path,
                "must differ from path",
            )
            .sha("sha", &self.sha)
            .required_branch("branch", &self.branch);
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Renamed {
    success: bool,
    path: String,
    source_removed: bool,
}

/// POST /api/rename-file
pub async fn rename_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RenameFileBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;

    let outcome = move_entry(
        forge.as_ref(),
        &MoveEntryRequest {
            repo: RepoId::new(&body.owner, &body.repo),
            branch: Some(body.branch),
            from: body.path,
            to: body.new_path,
            sha: body.sha,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(Renamed {
        success: true,
        path: outcome.to,
        source_removed: outcome.source_removed,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MoveFileItem {
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MoveFilesBody {
    pub owner: String,
    pub repo: String,
    pub files: Vec<MoveFileItem>,
    /// Target directory; empty for the repository root.
    pub destination: String,
    pub branch: String,
}

impl Validate for MoveFilesBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .check(
                "files",
                !self.files.is_empty(),
                "must contain at least one item",
            )
            .optional_path("destination", &self.destination)
            .required_branch("branch", &self.branch);

        for (i, item) in self.files.iter().enumerate() {
            v.path(&format!("files[{i}].path"), &item.path);
            if item.kind == EntryKind::File {
                v.sha(&format!("files[{i}].sha"), &item.sha);
            }
        }

        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Moved {
    success: bool,
    moved: usize,
    failed: usize,
    skipped: usize,
}

/// POST /api/move-files
///
/// Moves files into `destination` one at a time. Items that fail are
/// counted; the rest of the batch still runs.
pub async fn move_files(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<MoveFilesBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;

    let report = move_batch(
        forge.as_ref(),
        MoveBatch {
            repo: RepoId::new(&body.owner, &body.repo),
            branch: Some(body.branch),
            destination: body.destination,
            items: body
                .files
                .into_iter()
                .map(|item| MoveItem {
                    path: item.path,
                    sha: item.sha,
                    kind: item.kind,
                })
                .collect(),
        },
    )
    .await;

    Ok(HttpResponse::Ok().json(Moved {
        success: report.failed == 0,
        moved: report.moved,
        failed: report.failed,
        skipped: report.skipped,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UploadFileItem {
    pub path: String,
    pub content: String,
    pub encoding: ContentEncoding,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UploadFilesBody {
    pub owner: String,
    pub repo: String,
    pub files: Vec<UploadFileItem>,
    pub message: Option<String>,
    pub branch: Option<String>,
}

impl Validate for UploadFilesBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .check(
                "files",
                !self.files.is_empty() && self.files.len() <= MAX_UPLOAD_FILES,
                "must contain between 1 and 100 files",
            )
            .message("message", self.message.as_deref())
            .branch("branch", self.branch.as_deref());

        for (i, item) in self.files.iter().enumerate() {
            let field = format!("files[{i}].path");
            v.path(&field, &item.path)
                .check(&field, !item.path.ends_with('/'), "must name a file")
                .check(
                    &format!("files[{i}].content"),
                    item.encoding.decode(&item.content).is_ok(),
                    "must be valid base64",
                );
        }

        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Uploaded {
    success: bool,
    results: Vec<UploadResult>,
    summary: UploadSummary,
}

/// POST /api/upload-files
///
/// Creates up to 100 files concurrently and reports each outcome.
pub async fn upload_files(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UploadFilesBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;

    let files = body
        .files
        .into_iter()
        .map(|item| -> Result<UploadFile> {
            Ok(UploadFile {
                content: item.encoding.decode(&item.content)?,
                path: item.path,
            })
        })
        .collect::<Result<Vec<UploadFile>>>()?;

    let report = upload_batch(
        forge.as_ref(),
        UploadBatch {
            repo: RepoId::new(&body.owner, &body.repo),
            branch: body.branch,
            message: body.message,
            files,
        },
    )
    .await;

    if report.summary.failed > 0 {
        warn!(
            "{} of {} uploads to {}/{} failed",
            report.summary.failed, report.summary.total, body.owner, body.repo
        );
    }

    Ok(HttpResponse::Ok().json(Uploaded {
        success: report.summary.failed == 0,
        results: report.results,
        summary: report.summary,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListContentsBody {
    pub owner: String,
    pub repo: String,
    /// Directory to list; empty for the repository root.
    pub path: String,
    pub branch: Option<String>,
}

impl Validate for ListContentsBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .optional_path("path", &self.path)
            .branch("branch", self.branch.as_deref());
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Listing {
    success: bool,
    data: Vec<ContentEntry>,
}

/// Directories first, then files, each by case-insensitive name.
pub fn sort_entries(entries: &mut [ContentEntry]) {
    entries.sort_by(|a, b| {
        let a_dir = a.kind == ContentKind::Dir;
        let b_dir = b.kind == ContentKind::Dir;
        b_dir
            .cmp(&a_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// POST /api/list-contents
pub async fn list_contents(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ListContentsBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;

    let mut entries = forge
        .list_contents(ListContentsRequest {
            repo: RepoId::new(&body.owner, &body.repo),
            path: body.path.trim_end_matches('/').to_string(),
            branch: body.branch,
        })
        .await?;

    sort_entries(&mut entries);

    Ok(HttpResponse::Ok().json(Listing {
        success: true,
        data: entries,
    }))
}
