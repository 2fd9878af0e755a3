//! Session store backed by a TOML file.
//!
//! The file is owned by whatever issues sessions; this service only reads it.
//! It is re-read on every lookup so revoked sessions and rotated tokens take
//! effect immediately.
use async_trait::async_trait;
use log::*;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

use crate::{
    Result,
    auth::credential::{Credential, CredentialResolver, RequestContext},
};

#[derive(Debug, Deserialize)]
struct SessionRecord {
    token: String,
    account: String,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SessionFile {
    sessions: Vec<SessionRecord>,
}

/// Resolves callers against the `[[sessions]]` entries of a TOML file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<SessionFile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("session file not found: {}", self.path.display());
                Ok(SessionFile::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl CredentialResolver for FileSessionStore {
    async fn resolve_caller(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Credential>> {
        let Some(session_token) = ctx.session_token.as_deref() else {
            return Ok(None);
        };

        let file = self.load().await?;

        let Some(record) =
            file.sessions.into_iter().find(|s| s.token == session_token)
        else {
            debug!("no session matches the presented token");
            return Ok(None);
        };

        match record.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(Some(
                Credential::new(record.account, SecretString::from(access_token)),
            )),
            _ => {
                info!("account {} has no connected GitHub token", record.account);
                Ok(None)
            }
        }
    }
}
