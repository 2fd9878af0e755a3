//! Configuration for the GitHub API connection.
use serde::Deserialize;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// REST API version pinned through the `X-GitHub-Api-Version` header.
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
/// Identifying user agent sent with every upstream request.
pub const DEFAULT_USER_AGENT: &str = concat!("repodesk/", env!("CARGO_PKG_VERSION"));
/// Media type requested from the REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
/// Page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Upper bound on pages fetched for a single listing.
pub const MAX_PAGES: u32 = 10;

/// Upstream connection settings, the `[github]` table of `repodesk.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// REST API base URL. Point this at a GitHub Enterprise instance or a
    /// test server to redirect all upstream traffic.
    pub api_url: String,
    pub api_version: String,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
