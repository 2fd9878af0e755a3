//! Input validation for request bodies.
//!
//! Every rule here runs before any upstream call. Path checks are the only
//! defence for the path-templated GitHub URLs, so they reject anything that
//! could escape the repository root.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::{Result, error::RepodeskError};

/// Maximum number of files accepted by a single upload batch.
pub const MAX_UPLOAD_FILES: usize = 100;
/// Maximum length of a repository-relative path.
pub const MAX_PATH_LEN: usize = 1024;
/// Maximum length of a commit message or pull request title.
pub const MAX_MESSAGE_LEN: usize = 1000;

static OWNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,38})$")
        .expect("owner pattern compiles")
});

static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("repo pattern compiles")
});

static BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._/+-]{1,255}$").expect("branch pattern compiles")
});

static SHA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9a-fA-F]{40}|[0-9a-fA-F]{64})$")
        .expect("sha pattern compiles")
});

/// A single offending field, reported in the `details` array of a 400.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Request bodies that can check themselves before being acted on.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Collects field errors so a single response can name every bad field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Record an error when `ok` is false.
    pub fn check(
        &mut self,
        field: &str,
        ok: bool,
        message: &str,
    ) -> &mut Self {
        if !ok {
            self.push(field, message);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
        self
    }

    pub fn required_opt<T>(
        &mut self,
        field: &str,
        value: &Option<T>,
    ) -> &mut Self {
        if value.is_none() {
            self.push(field, "is required");
        }
        self
    }

    pub fn owner(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, "is required");
        } else if !OWNER_RE.is_match(value) {
            self.push(field, "must be a valid GitHub account name");
        }
        self
    }

    pub fn repo_name(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, "is required");
        } else if !REPO_RE.is_match(value) || value == "." || value == ".." {
            self.push(field, "must be a valid repository name");
        }
        self
    }

    /// Required repository-relative path.
    pub fn path(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, "is required");
        } else if let Some(message) = path_problem(value) {
            self.push(field, message);
        }
        self
    }

    /// Path that may be empty, meaning the repository root.
    pub fn optional_path(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty()
            && let Some(message) = path_problem(value)
        {
            self.push(field, message);
        }
        self
    }

    pub fn branch(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if value.is_empty() {
                self.push(field, "must not be empty");
            } else if !BRANCH_RE.is_match(value)
                || value.contains("..")
                || value.starts_with('/')
                || value.ends_with('/')
                || value.ends_with(".lock")
            {
                self.push(field, "must be a valid branch name");
            }
        }
        self
    }

    pub fn required_branch(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, "is required");
            return self;
        }
        self.branch(field, Some(value))
    }

    pub fn sha(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, "is required");
        } else if !SHA_RE.is_match(value) {
            self.push(field, "must be a git object id");
        }
        self
    }

    pub fn message(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value
            && value.chars().count() > MAX_MESSAGE_LEN
        {
            self.push(
                field,
                format!("must be at most {MAX_MESSAGE_LEN} characters"),
            );
        }
        self
    }

    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(RepodeskError::Validation(self.errors))
        }
    }
}

fn path_problem(path: &str) -> Option<&'static str> {
    if path.len() > MAX_PATH_LEN {
        return Some("is too long");
    }
    if path.starts_with('/') {
        return Some("must not start with '/'");
    }
    if path.chars().any(|c| c.is_control() || c == '\\') {
        return Some("must not contain control characters or backslashes");
    }
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    for segment in trimmed.split('/') {
        if segment == ".." {
            return Some("must not contain '..' segments");
        }
        if segment.is_empty() || segment == "." {
            return Some("must not contain empty or '.' segments");
        }
    }
    None
}
