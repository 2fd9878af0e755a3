pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod forge;
pub mod handlers;
pub mod server;
pub mod validation;
pub mod workflow;

pub use error::{RepodeskError, Result};

#[cfg(test)]
pub mod test_helpers;
