//! Access to the upstream repository host.
//!
//! Handlers and workflows talk to GitHub only through the [`traits::Forge`]
//! trait, which keeps them testable against a mock.

/// Upstream connection settings and API limits.
pub mod config;

/// Builds a forge client for a resolved caller.
pub mod factory;

/// GitHub REST API client implementation.
pub mod github;

/// Request and response types shared by every forge implementation.
pub mod request;

/// The forge abstraction itself.
pub mod traits;
