//! Common test helpers shared across test modules.
//!
//! Provides an in-memory credential resolver and a forge factory that hands
//! out a prepared mock, so handler tests never touch a session file or the
//! network.
use actix_web::web;
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    Result,
    auth::{Credential, CredentialResolver, RequestContext},
    config::LimitsConfig,
    forge::{
        factory::ForgeFactory,
        traits::{Forge, MockForge},
    },
    handlers::AppState,
};

/// Session token accepted by [`StaticSessionStore`].
pub const TEST_SESSION: &str = "test-session";
/// Account the test session resolves to.
pub const TEST_ACCOUNT: &str = "octocat";

/// Resolves [`TEST_SESSION`] to a fixed credential and nothing else.
pub struct StaticSessionStore {
    credential: Option<Credential>,
}

impl StaticSessionStore {
    pub fn connected(account: &str) -> Self {
        Self {
            credential: Some(Credential::new(
                account,
                SecretString::from("ghp_test"),
            )),
        }
    }

    /// A session exists but has no GitHub token attached.
    pub fn disconnected() -> Self {
        Self { credential: None }
    }
}

#[async_trait]
impl CredentialResolver for StaticSessionStore {
    async fn resolve_caller(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Credential>> {
        if ctx.session_token.as_deref() == Some(TEST_SESSION) {
            Ok(self.credential.clone())
        } else {
            Ok(None)
        }
    }
}

/// Hands out the same forge for every caller and counts how often it was
/// asked to.
pub struct StaticForgeFactory {
    forge: Arc<dyn Forge>,
    created: AtomicUsize,
}

impl StaticForgeFactory {
    pub fn new(forge: MockForge) -> Self {
        Self {
            forge: Arc::new(forge),
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ForgeFactory for StaticForgeFactory {
    fn create(&self, _credential: &Credential) -> Result<Arc<dyn Forge>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.forge.clone())
    }
}

/// Creates app state for a caller logged in as [`TEST_ACCOUNT`].
pub fn create_test_state(
    forge: MockForge,
) -> (web::Data<AppState>, Arc<StaticForgeFactory>) {
    create_test_state_with(StaticSessionStore::connected(TEST_ACCOUNT), forge)
}

pub fn create_test_state_with(
    store: StaticSessionStore,
    forge: MockForge,
) -> (web::Data<AppState>, Arc<StaticForgeFactory>) {
    let factory = Arc::new(StaticForgeFactory::new(forge));
    let state = AppState::new(
        LimitsConfig::default(),
        Arc::new(store),
        factory.clone(),
    );
    (web::Data::new(state), factory)
}
