//! Implements the Forge trait for GitHub
use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use log::*;
use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Result,
    error::RepodeskError,
    forge::{
        config::{DEFAULT_PAGE_SIZE, GITHUB_ACCEPT, MAX_PAGES, UpstreamConfig},
        github::types::{
            CreateCommit, CreatePull, CreateRef, CreateRepo, CreateTree,
            DeleteFileBody, EditRepo, GithubBlob, GithubBranch, GithubCommit,
            GithubContent, GithubContents, GithubError, GithubFileCommit,
            GithubPullRequest, GithubRef, GithubRepository, GithubTree,
            GithubTreeEntry, PutFileBody, UpdateRef,
        },
        request::{
            Branch, ContentEntry, CreateCommitRequest, CreatePrRequest,
            CreateRefRequest, CreateRepoRequest, CreateTreeRequest,
            DeleteFileRequest, FileCommit, FileContent, GetFileRequest,
            GitCommit, GitRef, ListContentsRequest, ListPullsRequest,
            ObjectKind, PullRequest, PutFileRequest, RepoId, Repository, Tree,
            TreeEntry, UpdateRefRequest, UpdateRepoRequest,
        },
        traits::Forge,
    },
};

mod types;

const API_VERSION_HEADER: &str = "x-github-api-version";

/// GitHub forge implementation using reqwest against the REST API.
pub struct Github {
    base_url: Url,
    client: Client,
}

impl Github {
    /// Create a GitHub client authenticated with the caller's access token.
    pub fn new(config: &UpstreamConfig, token: &SecretString) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let token_value = HeaderValue::from_str(
            format!("Bearer {}", token.expose_secret()).as_str(),
        )
        .map_err(|_| {
            RepodeskError::unauthenticated(
                "GitHub token contains invalid header characters",
            )
        })?;

        headers.append(AUTHORIZATION, token_value);
        headers.append(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        let api_version =
            HeaderValue::from_str(&config.api_version).map_err(|_| {
                RepodeskError::InvalidConfig(format!(
                    "github api_version is not a valid header value: {:?}",
                    config.api_version
                ))
            })?;
        headers.append(API_VERSION_HEADER, api_version);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .build()?;

        let base_url =
            Url::parse(&format!("{}/", config.api_url.trim_end_matches('/')))?;

        if base_url.cannot_be_a_base() {
            return Err(RepodeskError::InvalidConfig(format!(
                "github api_url is not a base url: {}",
                config.api_url
            )));
        }

        Ok(Self { base_url, client })
    }

    /// Build an endpoint URL from path segments. Segments containing `/`
    /// are split so each part gets percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|_| {
                RepodeskError::InvalidConfig(format!(
                    "github api_url is not a base url: {}",
                    self.base_url
                ))
            })?;
            parts.pop_if_empty();
            for segment in segments {
                parts.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    fn repo_endpoint(&self, repo: &RepoId, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.repo.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn with_ref(mut url: Url, branch: &Option<String>) -> Url {
        if let Some(branch) = branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }
        url
    }

    /// Turn a non-success response into an upstream error carrying the
    /// GitHub status and message.
    async fn upstream_error(response: Response) -> RepodeskError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<GithubError>(&text) {
            Ok(err) => err.describe(),
            Err(_) if text.is_empty() => status
                .canonical_reason()
                .unwrap_or("GitHub request failed")
                .to_string(),
            Err(_) => text,
        };
        debug!("github responded {status}: {message}");
        RepodeskError::upstream(status.as_u16(), message)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like `send`, but a 404 is `Ok(None)`.
    async fn send_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }
        Ok(Some(response.json::<T>().await?))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }

    fn json<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> RequestBuilder {
        self.client.request(method, url).json(body)
    }

    /// Fetch every page of a listing, up to `MAX_PAGES`.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Vec<T>> {
        let page_size = usize::from(DEFAULT_PAGE_SIZE);
        let mut items = vec![];

        for page in 1..=MAX_PAGES {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("per_page", &page_size.to_string())
                .append_pair("page", &page.to_string());

            let batch: Vec<T> = self.send(self.client.get(page_url)).await?;
            let count = batch.len();
            items.extend(batch);

            if count < page_size {
                return Ok(items);
            }
        }

        warn!("listing {url} exceeded {MAX_PAGES} pages: results truncated");
        Ok(items)
    }

    fn decode(encoded: &str) -> Result<Vec<u8>> {
        // the API wraps base64 content at 60 columns
        let compact = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>();
        Ok(BASE64_STANDARD.decode(compact)?)
    }

    async fn get_blob(&self, repo: &RepoId, sha: &str) -> Result<Vec<u8>> {
        let url = self.repo_endpoint(repo, &["git", "blobs", sha])?;
        let blob: GithubBlob = self.send(self.client.get(url)).await?;
        Self::decode(&blob.content)
    }
}

#[async_trait]
impl Forge for Github {
    async fn get_repo(&self, repo: RepoId) -> Result<Option<Repository>> {
        let url = self.repo_endpoint(&repo, &[])?;
        let found: Option<GithubRepository> =
            self.send_optional(self.client.get(url)).await?;
        Ok(found.map(Repository::from))
    }

    async fn list_repos(&self) -> Result<Vec<Repository>> {
        let mut url = self.endpoint(&["user", "repos"])?;
        url.query_pairs_mut()
            .append_pair("affiliation", "owner")
            .append_pair("sort", "updated");
        let repos: Vec<GithubRepository> = self.get_paginated(url).await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }

    async fn create_repo(&self, req: CreateRepoRequest) -> Result<Repository> {
        let url = self.endpoint(&["user", "repos"])?;
        let body = CreateRepo {
            name: req.name,
            description: req.description,
            private: req.private,
            auto_init: req.auto_init,
        };
        info!("creating repository {}", body.name);
        let repo: GithubRepository =
            self.send(self.json(Method::POST, url, &body)).await?;
        Ok(repo.into())
    }

    async fn update_repo(&self, req: UpdateRepoRequest) -> Result<Repository> {
        let url = self.repo_endpoint(&req.repo, &[])?;
        let body = EditRepo {
            name: req.name,
            description: req.description,
            homepage: req.homepage,
            private: req.private,
            default_branch: req.default_branch,
        };
        let repo: GithubRepository =
            self.send(self.json(Method::PATCH, url, &body)).await?;
        Ok(repo.into())
    }

    async fn delete_repo(&self, repo: RepoId) -> Result<()> {
        let url = self.repo_endpoint(&repo, &[])?;
        warn!("deleting repository {repo}");
        self.send_empty(self.client.delete(url)).await
    }

    async fn list_contents(
        &self,
        req: ListContentsRequest,
    ) -> Result<Vec<ContentEntry>> {
        let url = self.repo_endpoint(&req.repo, &["contents", &req.path])?;
        let url = Self::with_ref(url, &req.branch);
        let contents: GithubContents = self.send(self.client.get(url)).await?;

        let entries = match contents {
            GithubContents::Listing(items) => {
                items.into_iter().map(ContentEntry::from).collect()
            }
            GithubContents::Single(item) => vec![ContentEntry::from(*item)],
        };

        Ok(entries)
    }

    async fn get_file(
        &self,
        req: GetFileRequest,
    ) -> Result<Option<FileContent>> {
        let url = self.repo_endpoint(&req.repo, &["contents", &req.path])?;
        let url = Self::with_ref(url, &req.branch);

        let contents: Option<GithubContents> =
            self.send_optional(self.client.get(url)).await?;

        let file: GithubContent = match contents {
            None => {
                debug!("no file found for path: {}", req.path);
                return Ok(None);
            }
            Some(GithubContents::Listing(_)) => {
                return Err(RepodeskError::bad_request(format!(
                    "{} is a directory, not a file",
                    req.path
                )));
            }
            Some(GithubContents::Single(file)) => *file,
        };

        // files over 1MB come back without inline content
        let content = match (file.encoding.as_deref(), &file.content) {
            (Some("base64"), Some(encoded)) => Self::decode(encoded)?,
            _ => self.get_blob(&req.repo, &file.sha).await?,
        };

        Ok(Some(FileContent {
            path: file.path,
            sha: file.sha,
            content,
        }))
    }

    async fn put_file(&self, req: PutFileRequest) -> Result<FileCommit> {
        let url = self.repo_endpoint(&req.repo, &["contents", &req.path])?;
        let body = PutFileBody {
            message: req.message,
            content: BASE64_STANDARD.encode(&req.content),
            branch: req.branch,
            sha: req.sha,
        };

        debug!(
            "writing {} to {} (update: {})",
            req.path,
            req.repo,
            body.sha.is_some()
        );

        let commit: GithubFileCommit =
            self.send(self.json(Method::PUT, url, &body)).await?;

        Ok(FileCommit {
            path: commit
                .content
                .as_ref()
                .map(|c| c.path.clone())
                .unwrap_or(req.path),
            sha: commit.content.map(|c| c.sha),
            commit_sha: commit.commit.sha,
        })
    }

    async fn delete_file(&self, req: DeleteFileRequest) -> Result<()> {
        let url = self.repo_endpoint(&req.repo, &["contents", &req.path])?;
        let body = DeleteFileBody {
            message: req.message,
            sha: req.sha,
            branch: req.branch,
        };
        debug!("deleting {} from {}", req.path, req.repo);
        self.send_empty(self.json(Method::DELETE, url, &body)).await
    }

    async fn get_branch_ref(
        &self,
        repo: RepoId,
        branch: String,
    ) -> Result<Option<GitRef>> {
        let url = self.repo_endpoint(&repo, &["git", "ref", "heads", &branch])?;
        let found: Option<GithubRef> =
            self.send_optional(self.client.get(url)).await?;
        Ok(found.map(|r| GitRef {
            branch,
            sha: r.object.sha,
        }))
    }

    async fn create_ref(&self, req: CreateRefRequest) -> Result<GitRef> {
        let url = self.repo_endpoint(&req.repo, &["git", "refs"])?;
        let body = CreateRef {
            name: format!("refs/heads/{}", req.branch),
            sha: req.sha,
        };
        info!("creating branch {} in {}", req.branch, req.repo);
        let created: GithubRef =
            self.send(self.json(Method::POST, url, &body)).await?;
        Ok(GitRef {
            branch: req.branch,
            sha: created.object.sha,
        })
    }

    async fn update_ref(&self, req: UpdateRefRequest) -> Result<GitRef> {
        let url = self.repo_endpoint(
            &req.repo,
            &["git", "refs", "heads", &req.branch],
        )?;
        let body = UpdateRef {
            sha: req.sha,
            force: req.force,
        };
        let updated: GithubRef =
            self.send(self.json(Method::PATCH, url, &body)).await?;
        debug!("moved {} to {}", updated.name, updated.object.sha);
        Ok(GitRef {
            branch: req.branch,
            sha: updated.object.sha,
        })
    }

    async fn get_commit(&self, repo: RepoId, sha: String) -> Result<GitCommit> {
        let url = self.repo_endpoint(&repo, &["git", "commits", &sha])?;
        let commit: GithubCommit = self.send(self.client.get(url)).await?;
        Ok(GitCommit {
            sha: commit.sha,
            tree_sha: commit.tree.sha,
        })
    }

    async fn get_tree(&self, repo: RepoId, tree_ish: String) -> Result<Tree> {
        let mut url = self.repo_endpoint(&repo, &["git", "trees", &tree_ish])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let tree: GithubTree = self.send(self.client.get(url)).await?;

        if tree.truncated {
            warn!("tree listing for {repo}@{tree_ish} was truncated");
        }

        Ok(Tree {
            sha: tree.sha,
            truncated: tree.truncated,
            entries: tree
                .tree
                .into_iter()
                .map(|item| TreeEntry {
                    path: item.path,
                    kind: item.kind,
                    sha: item.sha,
                    mode: item.mode,
                })
                .collect(),
        })
    }

    async fn create_tree(&self, req: CreateTreeRequest) -> Result<String> {
        let url = self.repo_endpoint(&req.repo, &["git", "trees"])?;

        // nested blob paths recreate intermediate trees
        let tree = req
            .entries
            .into_iter()
            .filter(|e| e.kind != ObjectKind::Tree)
            .map(|e| GithubTreeEntry {
                path: e.path,
                mode: e.mode,
                kind: e.kind,
                sha: e.sha,
            })
            .collect::<Vec<GithubTreeEntry>>();

        info!("creating tree with {} entries in {}", tree.len(), req.repo);

        let created: GithubTree = self
            .send(self.json(Method::POST, url, &CreateTree { tree }))
            .await?;

        Ok(created.sha)
    }

    async fn create_commit(
        &self,
        req: CreateCommitRequest,
    ) -> Result<GitCommit> {
        let url = self.repo_endpoint(&req.repo, &["git", "commits"])?;
        let body = CreateCommit {
            message: req.message,
            tree: req.tree_sha,
            parents: req.parents,
        };
        let commit: GithubCommit =
            self.send(self.json(Method::POST, url, &body)).await?;
        info!("created commit {} in {}", commit.sha, req.repo);
        Ok(GitCommit {
            sha: commit.sha,
            tree_sha: commit.tree.sha,
        })
    }

    async fn list_branches(&self, repo: RepoId) -> Result<Vec<Branch>> {
        let url = self.repo_endpoint(&repo, &["branches"])?;
        let branches: Vec<GithubBranch> = self.get_paginated(url).await?;
        Ok(branches.into_iter().map(Branch::from).collect())
    }

    async fn list_pulls(
        &self,
        req: ListPullsRequest,
    ) -> Result<Vec<PullRequest>> {
        let mut url = self.repo_endpoint(&req.repo, &["pulls"])?;
        url.query_pairs_mut().append_pair("state", req.state.as_str());
        let pulls: Vec<GithubPullRequest> = self.get_paginated(url).await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let url = self.repo_endpoint(&req.repo, &["pulls"])?;
        let body = CreatePull {
            title: req.title,
            head: req.head,
            base: req.base,
            body: req.body,
        };
        let pr: GithubPullRequest =
            self.send(self.json(Method::POST, url, &body)).await?;
        info!("opened pull request #{} in {}", pr.number, req.repo);
        Ok(pr.into())
    }

    async fn list_starred(&self) -> Result<Vec<Repository>> {
        let url = self.endpoint(&["user", "starred"])?;
        let repos: Vec<GithubRepository> = self.get_paginated(url).await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }

    async fn set_starred(&self, repo: RepoId, starred: bool) -> Result<()> {
        let url = self.endpoint(&["user", "starred", &repo.owner, &repo.repo])?;
        let request = if starred {
            // PUT without a body must still send Content-Length: 0
            self.client.put(url).header(CONTENT_LENGTH, 0)
        } else {
            self.client.delete(url)
        };
        self.send_empty(request).await
    }
}
