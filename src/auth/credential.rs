use actix_web::{HttpRequest, http::header::AUTHORIZATION};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::{Result, error::RepodeskError};

/// The caller's GitHub identity and the token that acts on their behalf.
#[derive(Debug, Clone)]
pub struct Credential {
    /// GitHub login of the caller.
    pub account: String,
    pub token: SecretString,
}

impl Credential {
    pub fn new(account: impl Into<String>, token: SecretString) -> Self {
        Self {
            account: account.into(),
            token,
        }
    }

    /// Ownership gate: the named owner must be the caller's account, compared
    /// exactly.
    pub fn authorize(&self, owner: &str) -> Result<()> {
        if self.account == owner {
            Ok(())
        } else {
            Err(RepodeskError::forbidden(format!(
                "You do not have permission to modify repositories owned by {owner}"
            )))
        }
    }
}

/// Everything a resolver may look at to identify the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Bearer token from the `Authorization` header.
    pub session_token: Option<String>,
}

impl RequestContext {
    pub fn from_request(req: &HttpRequest) -> Self {
        let session_token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("bearer "))
            })
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Self { session_token }
    }
}

/// Resolves the caller of a request to a stored credential.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// `Ok(None)` when the caller has no session or no connected GitHub
    /// account.
    async fn resolve_caller(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Credential>>;
}
