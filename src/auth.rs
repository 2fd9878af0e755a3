//! Caller identity: who is making a request and which GitHub token acts for
//! them.

/// Credential, request context and the ownership gate.
pub mod credential;

/// File-backed session store.
pub mod session_store;

pub use credential::{Credential, CredentialResolver, RequestContext};
pub use session_store::FileSessionStore;
