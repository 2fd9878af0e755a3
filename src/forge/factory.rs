//! Factory for creating forge clients bound to a caller's credential.

use std::sync::Arc;

use crate::{
    Result,
    auth::Credential,
    forge::{config::UpstreamConfig, github::Github, traits::Forge},
};

/// Creates a forge client for a resolved caller.
pub trait ForgeFactory: Send + Sync {
    fn create(&self, credential: &Credential) -> Result<Arc<dyn Forge>>;
}

/// Factory producing GitHub REST clients.
pub struct GithubFactory {
    config: UpstreamConfig,
}

impl GithubFactory {
    pub fn new(config: UpstreamConfig) -> Self {
        Self { config }
    }
}

impl ForgeFactory for GithubFactory {
    fn create(&self, credential: &Credential) -> Result<Arc<dyn Forge>> {
        Ok(Arc::new(Github::new(&self.config, &credential.token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn creates_client_for_credential() {
        let factory = GithubFactory::new(UpstreamConfig::default());
        let credential = Credential::new("octocat", SecretString::from("ghp_test"));
        assert!(factory.create(&credential).is_ok());
    }

    #[test]
    fn rejects_token_with_invalid_header_characters() {
        let factory = GithubFactory::new(UpstreamConfig::default());
        let credential =
            Credential::new("octocat", SecretString::from("bad\ntoken"));
        assert!(factory.create(&credential).is_err());
    }
}
