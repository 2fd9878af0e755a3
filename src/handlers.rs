//! HTTP handlers, one per operation.
//!
//! Every operation is `POST /api/<operation>` with a JSON body. Handlers run
//! the same steps in the same order: validate the body, resolve the caller,
//! check ownership, then talk to GitHub. Nothing reaches GitHub before the
//! first three steps pass.
use actix_web::{
    HttpRequest, HttpResponse, Resource, Route,
    http::Method,
    middleware::DefaultHeaders,
    web,
};
use std::sync::Arc;

use crate::{
    Result,
    auth::{Credential, CredentialResolver, RequestContext},
    config::LimitsConfig,
    error::RepodeskError,
    forge::{factory::ForgeFactory, traits::Forge},
};

/// File and directory operations.
pub mod files;

/// Pull request listing and creation.
pub mod pulls;

/// Repository, branch and star operations.
pub mod repos;

/// Repository to repository sync.
pub mod sync;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub limits: LimitsConfig,
    pub resolver: Arc<dyn CredentialResolver>,
    pub forges: Arc<dyn ForgeFactory>,
}

impl AppState {
    pub fn new(
        limits: LimitsConfig,
        resolver: Arc<dyn CredentialResolver>,
        forges: Arc<dyn ForgeFactory>,
    ) -> Self {
        Self {
            limits,
            resolver,
            forges,
        }
    }

    /// Resolve the caller's stored GitHub credential.
    pub async fn caller(&self, req: &HttpRequest) -> Result<Credential> {
        let ctx = RequestContext::from_request(req);

        if ctx.session_token.is_none() {
            return Err(RepodeskError::unauthenticated(
                "Missing authorization header",
            ));
        }

        self.resolver.resolve_caller(&ctx).await?.ok_or_else(|| {
            RepodeskError::unauthenticated(
                "No GitHub account connected for this session",
            )
        })
    }

    /// Resolve the caller and a forge acting for them, without an ownership
    /// check. Used by operations scoped to the caller's own account.
    pub async fn caller_forge(
        &self,
        req: &HttpRequest,
    ) -> Result<(Credential, Arc<dyn Forge>)> {
        let credential = self.caller(req).await?;
        let forge = self.forges.create(&credential)?;
        Ok((credential, forge))
    }

    /// Resolve the caller, require that they are `owner`, and return a forge
    /// acting for them.
    pub async fn owner_forge(
        &self,
        req: &HttpRequest,
        owner: &str,
    ) -> Result<(Credential, Arc<dyn Forge>)> {
        let credential = self.caller(req).await?;
        credential.authorize(owner)?;
        let forge = self.forges.create(&credential)?;
        Ok((credential, forge))
    }
}

/// Permissive CORS headers added to every response.
pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST, GET, OPTIONS"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ))
}

/// Answers CORS preflight requests.
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// JSON extractor settings. Malformed bodies are reported like any other
/// validation failure, against the `body` field.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            RepodeskError::invalid_field("body", err.to_string()).into()
        })
}

fn operation(path: &str, route: Route) -> Resource {
    web::resource(path)
        .route(route)
        .route(web::method(Method::OPTIONS).to(preflight))
}

/// Register every `/api/<operation>` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(operation(
        "/api/create-file",
        web::post().to(files::create_file),
    ))
    .service(operation(
        "/api/delete-file",
        web::post().to(files::delete_file),
    ))
    .service(operation(
        "/api/rename-file",
        web::post().to(files::rename_file),
    ))
    .service(operation("/api/move-files", web::post().to(files::move_files)))
    .service(operation(
        "/api/upload-files",
        web::post().to(files::upload_files),
    ))
    .service(operation(
        "/api/list-contents",
        web::post().to(files::list_contents),
    ))
    .service(operation("/api/sync-repos", web::post().to(sync::sync_repos)))
    .service(operation(
        "/api/list-branches",
        web::post().to(repos::list_branches),
    ))
    .service(operation("/api/list-pulls", web::post().to(pulls::list_pulls)))
    .service(operation("/api/create-pr", web::post().to(pulls::create_pr)))
    .service(operation("/api/star-repo", web::post().to(repos::star_repo)))
    .service(operation(
        "/api/list-starred",
        web::post().to(repos::list_starred),
    ))
    .service(operation("/api/list-repos", web::post().to(repos::list_repos)))
    .service(operation(
        "/api/create-repo",
        web::post().to(repos::create_repo),
    ))
    .service(operation(
        "/api/rename-repo",
        web::post().to(repos::rename_repo),
    ))
    .service(operation(
        "/api/update-repo",
        web::post().to(repos::update_repo),
    ))
    .service(operation(
        "/api/delete-repo",
        web::post().to(repos::delete_repo),
    ));
}
