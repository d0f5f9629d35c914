//! Environment-driven configuration.

use std::fmt;

use reqwest::Url;

use crate::remote::{DEFAULT_API_URL, FileLocation, GitHubContents};
use crate::store::StoreOptions;
use crate::Error;

pub const DEFAULT_DB_FILE: &str = "phone_numbers.json";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update phone number database";

/// Everything needed to reach the document: credential, coordinates, API
/// root and the commit message used for every save.
#[derive(Clone)]
pub struct StoreConfig {
    pub token: String,
    pub location: FileLocation,
    pub api_url: String,
    pub commit_message: String,
}

impl StoreConfig {
    /// Reads `GITHUB_TOKEN`, `GITHUB_OWNER`, `GITHUB_REPO` and the optional
    /// `DB_FILE`, `GITHUB_BRANCH`, `GITHUB_API_URL`, `DB_COMMIT_MESSAGE`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str| optional(key).ok_or_else(|| Error::Config(format!("{} is not set", key)));

        let token = required("GITHUB_TOKEN")?;
        let owner = required("GITHUB_OWNER")?;
        let repo = required("GITHUB_REPO")?;
        let path = optional("DB_FILE").unwrap_or_else(|| DEFAULT_DB_FILE.to_string());

        let api_url = optional("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Url::parse(&api_url)
            .map_err(|e| Error::Config(format!("invalid GITHUB_API_URL {:?}: {}", api_url, e)))?;

        let mut location = FileLocation::new(owner, repo, path);
        if let Some(branch) = optional("GITHUB_BRANCH") {
            location = location.with_branch(branch);
        }

        Ok(Self {
            token,
            location,
            api_url,
            commit_message: optional("DB_COMMIT_MESSAGE")
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        })
    }

    pub fn client(&self) -> Result<GitHubContents, Error> {
        GitHubContents::with_base_url(self.token.clone(), &self.api_url)
    }

    pub fn options(&self) -> StoreOptions {
        StoreOptions::new(self.location.clone()).commit_message(self.commit_message.clone())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("token", &"<redacted>")
            .field("location", &self.location)
            .field("api_url", &self.api_url)
            .field("commit_message", &self.commit_message)
            .finish()
    }
}
