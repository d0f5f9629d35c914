//! In-process content store with the same revision rules as the remote API.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use contents_types::blob_sha;

use super::{ContentStore, FileLocation, RemoteFile};
use crate::Error;

/// A write accepted or rejected by [`MemoryContents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutLog {
    pub location: FileLocation,
    pub message: String,
    pub sha: Option<String>,
    pub accepted: bool,
}

/// [`ContentStore`] kept in memory. Revisions are git blob ids of the
/// content, so identical content always carries the same token.
#[derive(Default)]
pub struct MemoryContents {
    files: Mutex<HashMap<FileLocation, RemoteFile>>,
    puts: Mutex<Vec<PutLog>>,
}

impl MemoryContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `content` unconditionally and returns its revision.
    pub fn insert(&self, location: FileLocation, content: impl Into<Vec<u8>>) -> String {
        let content = content.into();
        let sha = blob_sha(&content);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location, RemoteFile { content, sha: sha.clone() });
        sha
    }

    pub fn file(&self, location: &FileLocation) -> Option<RemoteFile> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned()
    }

    /// Every write attempted so far, oldest first.
    pub fn puts(&self) -> Vec<PutLog> {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ContentStore for MemoryContents {
    async fn get_content(&self, location: &FileLocation) -> Result<RemoteFile, Error> {
        self.file(location).ok_or_else(|| Error::NotFound {
            path: location.to_string(),
        })
    }

    async fn put_content(
        &self,
        location: &FileLocation,
        message: &str,
        content: Vec<u8>,
        sha: Option<String>,
    ) -> Result<String, Error> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let current = files.get(location).map(|file| file.sha.as_str());

        let result = match (current, sha.as_deref()) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(Error::NotFound {
                path: location.to_string(),
            }),
            (Some(current), Some(given)) if current == given => Ok(()),
            (Some(_), _) => Err(Error::Conflict {
                path: location.to_string(),
            }),
        };

        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PutLog {
                location: location.clone(),
                message: message.to_string(),
                sha,
                accepted: result.is_ok(),
            });

        result?;
        let new_sha = blob_sha(&content);
        files.insert(
            location.clone(),
            RemoteFile {
                content,
                sha: new_sha.clone(),
            },
        );
        Ok(new_sha)
    }
}
