//! The remote content store seam and its implementations.

use std::fmt;

use async_trait::async_trait;

use crate::Error;

mod github;
mod memory;

pub use github::{DEFAULT_API_URL, GitHubContents};
pub use memory::{MemoryContents, PutLog};

/// Coordinates of the document inside a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocation {
    pub owner: String,
    pub repo: String,
    pub path: String,
    /// Branch to read and commit to; the repository default when `None`.
    pub branch: Option<String>,
}

impl FileLocation {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            path: path.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.path)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{}", branch)?;
        }
        Ok(())
    }
}

/// A fetched file: decoded bytes plus its revision token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub sha: String,
}

/// A version-controlled file store addressed by [`FileLocation`].
///
/// Implementations must report a missing file as [`Error::NotFound`] and a
/// write naming a stale revision as [`Error::Conflict`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_content(&self, location: &FileLocation) -> Result<RemoteFile, Error>;

    /// Creates the file when `sha` is `None`, otherwise replaces it if `sha`
    /// is still its current revision. Returns the new revision.
    async fn put_content(
        &self,
        location: &FileLocation,
        message: &str,
        content: Vec<u8>,
        sha: Option<String>,
    ) -> Result<String, Error>;
}
