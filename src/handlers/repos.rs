//! Handlers for repositories, branches and stars.
use actix_web::{HttpRequest, HttpResponse, web};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    forge::request::{
        Branch, CreateRepoRequest, RepoId, Repository, UpdateRepoRequest,
    },
    handlers::AppState,
    validation::{Validate, Validator},
};

/// Body of every operation that targets one repository and nothing else.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RepoBody {
    pub owner: String,
    pub repo: String,
}

impl Validate for RepoBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner).repo_name("repo", &self.repo);
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Branches {
    success: bool,
    branches: Vec<Branch>,
}

#[derive(Debug, Serialize)]
struct Repositories {
    success: bool,
    repositories: Vec<Repository>,
}

#[derive(Debug, Serialize)]
struct RepositoryResponse {
    success: bool,
    repository: Repository,
}

#[derive(Debug, Serialize)]
struct Done {
    success: bool,
}

/// POST /api/list-branches
pub async fn list_branches(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RepoBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;
    let branches = forge
        .list_branches(RepoId::new(body.owner, body.repo))
        .await?;

    Ok(HttpResponse::Ok().json(Branches {
        success: true,
        branches,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StarBody {
    pub owner: String,
    pub repo: String,
    pub starred: Option<bool>,
}

impl Validate for StarBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .required_opt("starred", &self.starred);
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct Starred {
    success: bool,
    starred: bool,
}

/// POST /api/star-repo
///
/// Stars or unstars any repository for the caller; `owner` here names the
/// starred repository, not the caller.
pub async fn star_repo(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<StarBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (credential, forge) = state.caller_forge(&req).await?;
    let starred = body.starred.unwrap_or(true);
    let repo = RepoId::new(body.owner, body.repo);

    forge.set_starred(repo.clone(), starred).await?;
    debug!("{} set starred={starred} on {repo}", credential.account);

    Ok(HttpResponse::Ok().json(Starred {
        success: true,
        starred,
    }))
}

/// POST /api/list-starred
pub async fn list_starred(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let (_, forge) = state.caller_forge(&req).await?;
    let repositories = forge.list_starred().await?;

    Ok(HttpResponse::Ok().json(Repositories {
        success: true,
        repositories,
    }))
}

/// POST /api/list-repos
///
/// Repositories owned by the caller, most recently updated first.
pub async fn list_repos(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let (_, forge) = state.caller_forge(&req).await?;
    let repositories = forge.list_repos().await?;

    Ok(HttpResponse::Ok().json(Repositories {
        success: true,
        repositories,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateRepoBody {
    pub name: String,
    pub description: Option<String>,
    pub private: Option<bool>,
    pub auto_init: Option<bool>,
}

impl Validate for CreateRepoBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.repo_name("name", &self.name)
            .message("description", self.description.as_deref());
        v.into_result()
    }
}

/// POST /api/create-repo
///
/// Creates a repository under the caller's account.
pub async fn create_repo(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateRepoBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.caller_forge(&req).await?;
    let repository = forge
        .create_repo(CreateRepoRequest {
            name: body.name,
            description: body.description,
            private: body.private.unwrap_or(false),
            auto_init: body.auto_init.unwrap_or(true),
        })
        .await?;

    Ok(HttpResponse::Ok().json(RepositoryResponse {
        success: true,
        repository,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameRepoBody {
    pub owner: String,
    pub repo: String,
    pub new_name: String,
}

impl Validate for RenameRepoBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .repo_name("new_name", &self.new_name);
        v.into_result()
    }
}

/// POST /api/rename-repo
pub async fn rename_repo(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RenameRepoBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;
    info!("renaming {}/{} to {}", body.owner, body.repo, body.new_name);

    let repository = forge
        .update_repo(UpdateRepoRequest {
            repo: RepoId::new(body.owner, body.repo),
            name: Some(body.new_name),
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(RepositoryResponse {
        success: true,
        repository,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRepoBody {
    pub owner: String,
    pub repo: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub private: Option<bool>,
    pub default_branch: Option<String>,
}

impl UpdateRepoBody {
    fn has_changes(&self) -> bool {
        self.description.is_some()
            || self.homepage.is_some()
            || self.private.is_some()
            || self.default_branch.is_some()
    }
}

impl Validate for UpdateRepoBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner)
            .repo_name("repo", &self.repo)
            .message("description", self.description.as_deref())
            .branch("default_branch", self.default_branch.as_deref())
            .check(
                "body",
                self.has_changes(),
                "must include at least one field to update",
            );
        v.into_result()
    }
}

/// POST /api/update-repo
pub async fn update_repo(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UpdateRepoBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;
    let repository = forge
        .update_repo(UpdateRepoRequest {
            repo: RepoId::new(body.owner, body.repo),
            name: None,
            description: body.description,
            homepage: body.homepage,
            private: body.private,
            default_branch: body.default_branch,
        })
        .await?;

    Ok(HttpResponse::Ok().json(RepositoryResponse {
        success: true,
        repository,
    }))
}

/// POST /api/delete-repo
pub async fn delete_repo(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RepoBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;
    forge
        .delete_repo(RepoId::new(body.owner, body.repo))
        .await?;

    Ok(HttpResponse::Ok().json(Done { success: true }))
}
