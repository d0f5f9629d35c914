//! Wire types for the repository contents API.
//!
//! Covers the two calls the record store needs: reading a single file
//! (`GET /repos/{owner}/{repo}/contents/{path}`) and creating or replacing it
//! (`PUT` on the same URL). File bodies travel base64-encoded; the helpers
//! here convert between raw bytes and the transport form.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

pub use base64::DecodeError;

/// Encoding name the API uses for inline file content.
pub const BASE64_ENCODING: &str = "base64";

/// A file as returned by a contents `GET`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
    pub sha: String,
}

impl ContentFile {
    /// Decodes the inline content. Returns `None` when the content is not
    /// inlined as base64 (files above the API's inline size limit).
    pub fn decoded(&self) -> Option<Result<Vec<u8>, DecodeError>> {
        if self.encoding != BASE64_ENCODING {
            return None;
        }
        Some(decode_content(&self.content))
    }
}

/// Body of a contents `PUT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutContentRequest {
    pub message: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Response of a successful contents `PUT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutContentResponse {
    pub content: ContentRef,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    #[serde(default)]
    pub message: String,
}

/// Error body the API attaches to non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub documentation_url: Option<String>,
}

/// Encodes raw file bytes for transport.
pub fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes transport content. The API wraps base64 at 60 columns, so
/// whitespace is stripped first.
pub fn decode_content(content: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

/// Git blob id of `bytes`, the revision token the contents API reports.
pub fn blob_sha(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", bytes.len()).as_bytes());
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_sha_matches_git() {
        assert_eq!(blob_sha(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        assert_eq!(blob_sha(b"hello\n"), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn decode_accepts_wrapped_content() {
        let wrapped = "W3sKICAiaWQiOiAiMSIK\nfV0=\n";
        assert_eq!(decode_content(wrapped).unwrap(), b"[{\n  \"id\": \"1\"\n}]");
    }

    #[test]
    fn decoded_skips_non_inline_files() {
        let file: ContentFile = serde_json::from_value(serde_json::json!({
            "type": "file",
            "encoding": "none",
            "size": 2_000_000,
            "name": "big.json",
            "path": "big.json",
            "content": "",
            "sha": "abc",
        }))
        .unwrap();
        assert!(file.decoded().is_none());
    }

    #[test]
    fn put_request_omits_missing_sha() {
        let request = PutContentRequest {
            message: "m".to_string(),
            content: encode_content(b"[]"),
            sha: None,
            branch: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"message": "m", "content": "W10="}));
    }
}
