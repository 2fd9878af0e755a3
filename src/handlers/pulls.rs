//! Handlers for pull requests.
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::RepodeskError,
    forge::request::{
        CreatePrRequest, ListPullsRequest, PullRequest, PullState, RepoId,
    },
    handlers::AppState,
    validation::{Validate, Validator},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListPullsBody {
    pub owner: String,
    pub repo: String,
    pub state: PullState,
}

impl Validate for ListPullsBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.owner("owner", &self.owner).repo_name("repo", &self.repo);
        v.into_result()
    }
}

#[derive(Debug, Serialize)]
struct PullRequests {
    success: bool,
    pull_requests: Vec<PullRequest>,
}

/// POST /api/list-pulls
pub async fn list_pulls(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ListPullsBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (_, forge) = state.owner_forge(&req, &body.owner).await?;
    let pull_requests = forge
        .list_pulls(ListPullsRequest {
            repo: RepoId::new(body.owner, body.repo),
            state: body.state,
        })
        .await?;

    Ok(HttpResponse::Ok().json(PullRequests {
        success: true,
        pull_requests,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePrBody {
    /// Repository under the caller's account.
    pub repository_name: String,
    pub title: String,
    pub body: Option<String>,
    pub head: String,
    pub base: String,
}

impl Validate for CreatePrBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.repo_name("repositoryName", &self.repository_name)
            .required("title", &self.title)
            .message("title", Some(&self.title))
            .required_branch("head", &self.head)
            .required_branch("base", &self.base)
            .check(
                "head",
                self.head.is_empty() || self.head != self.base,
                "must differ from base",
            );
        v.into_result()
    }
}

/// Rewrite the GitHub errors users actually hit into something readable.
fn pr_error(err: RepodeskError, head: &str, base: &str) -> RepodeskError {
    match err.upstream_status() {
        Some(401) => {
            RepodeskError::unauthenticated("GitHub token is invalid or expired")
        }
        Some(422) if err.to_string().contains("No commits between") => {
            RepodeskError::upstream(
                422,
                format!("No changes between {head} and {base}"),
            )
        }
        _ => err,
    }
}

#[derive(Debug, Serialize)]
struct PrCreated {
    success: bool,
    pull_request_url: String,
    pull_request_number: u64,
}

/// POST /api/create-pr
///
/// Opens a pull request in one of the caller's repositories.
pub async fn create_pr(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreatePrBody>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (credential, forge) = state.caller_forge(&req).await?;

    let pr = forge
        .create_pr(CreatePrRequest {
            repo: RepoId::new(&credential.account, &body.repository_name),
            title: body.title,
            body: body.body.unwrap_or_default(),
            head: body.head.clone(),
            base: body.base.clone(),
        })
        .await
        .map_err(|err| pr_error(err, &body.head, &body.base))?;

    Ok(HttpResponse::Ok().json(PrCreated {
        success: true,
        pull_request_url: pr.html_url,
        pull_request_number: pr.number,
    }))
}
