//! Contents API client over HTTP.

use async_trait::async_trait;
use contents_types::{
    ContentFile, ErrorBody, PutContentRequest, PutContentResponse, encode_content,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use tracing::debug;

use super::{ContentStore, FileLocation, RemoteFile};
use crate::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("record-store/", env!("CARGO_PKG_VERSION"));

/// [`ContentStore`] backed by the GitHub repository contents API.
#[derive(Clone)]
pub struct GitHubContents {
    http: Client,
    base: Url,
    token: String,
}

impl GitHubContents {
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Targets another API root, e.g. an Enterprise Server
    /// (`https://ghe.example.com/api/v3`) or a test server.
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self, Error> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API URL {:?}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("invalid API URL {:?}", base_url)));
        }

        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base,
            token: token.into(),
        })
    }

    fn contents_url(&self, location: &FileLocation) -> Result<Url, Error> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("invalid API URL {:?}", self.base.as_str())))?
            .pop_if_empty()
            .extend([
                "repos",
                location.owner.as_str(),
                location.repo.as_str(),
                "contents",
            ])
            .extend(location.path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

#[async_trait]
impl ContentStore for GitHubContents {
    async fn get_content(&self, location: &FileLocation) -> Result<RemoteFile, Error> {
        let mut url = self.contents_url(location)?;
        if let Some(branch) = &location.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        debug!(%location, "fetching remote file");
        let response = self.request(Method::GET, url).send().await?;
        let file: ContentFile = check(response, location).await?.json().await?;

        let content = match file.decoded() {
            Some(decoded) => decoded?,
            None => return Err(Error::UnsupportedEncoding(file.encoding)),
        };

        Ok(RemoteFile {
            content,
            sha: file.sha,
        })
    }

    async fn put_content(
        &self,
        location: &FileLocation,
        message: &str,
        content: Vec<u8>,
        sha: Option<String>,
    ) -> Result<String, Error> {
        let url = self.contents_url(location)?;
        let body = PutContentRequest {
            message: message.to_string(),
            content: encode_content(&content),
            sha,
            branch: location.branch.clone(),
        };

        debug!(%location, create = body.sha.is_none(), "writing remote file");
        let response = self.request(Method::PUT, url).json(&body).send().await?;
        let written: PutContentResponse = check(response, location).await?.json().await?;

        Ok(written.content.sha)
    }
}

/// Maps a non-2xx response onto the error taxonomy.
async fn check(response: Response, location: &FileLocation) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .is_some_and(|remaining| remaining.as_bytes() == b"0");
    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = if body.message.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body.message
    };

    let path = location.to_string();
    Err(match status {
        StatusCode::NOT_FOUND => Error::NotFound { path },
        StatusCode::CONFLICT => Error::Conflict { path },
        // Sent when an existing file is written without its sha.
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("sha") => Error::Conflict { path },
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        StatusCode::FORBIDDEN if rate_exhausted => Error::RateLimited(message),
        StatusCode::FORBIDDEN => Error::Unauthorized(message),
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    })
}
