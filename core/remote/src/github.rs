//! GitHub contents API client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use gitvault_common::{AccessToken, Error, Result, VaultPath};

use crate::repository::{Account, Branch, RemoteFileState, RemoteRepository, Repository};

/// GitHub REST API base URL.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// Page size for repository and branch listings.
const PAGE_SIZE: usize = 100;

/// Characters escaped within a path segment of a contents URL.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Authenticated user from the API.
#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
    #[serde(default)]
    name: Option<String>,
}

/// Repository from the API.
#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    private: bool,
}

/// Branch from the API.
#[derive(Debug, Deserialize)]
struct BranchResponse {
    name: String,
    #[serde(default)]
    protected: bool,
}

/// File content from the contents API.
#[derive(Debug, Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Response to a contents PUT.
#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Debug, Deserialize)]
struct WrittenContent {
    sha: String,
}

/// GitHub API client.
///
/// The blob `sha` reported by the contents API serves as the version
/// marker: reads return it, writes send it back as the expected revision
/// and return the new one.
pub struct GitHubClient {
    http: Client,
    token: AccessToken,
}

impl GitHubClient {
    /// Create a new client for a personal access token.
    pub fn new(token: AccessToken) -> Self {
        let http = Client::builder()
            .user_agent("gitvault/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { http, token }
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.token.as_str())
    }

    fn contents_url(repo: &str, path: &VaultPath) -> String {
        let encoded: Vec<String> = path
            .components()
            .iter()
            .map(|c| utf8_percent_encode(c, PATH_SEGMENT).to_string())
            .collect();
        format!(
            "{}/repos/{}/contents/{}",
            GITHUB_API_BASE,
            repo,
            encoded.join("/")
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header())
            .header(header::ACCEPT, "application/vnd.github+json")
    }

    /// Handle an API response with error classification.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Network(format!("Failed to parse response: {}", e)))
        } else {
            let rate_exhausted = rate_limit_exhausted(&response);
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, rate_exhausted, &body))
        }
    }
}

/// Whether the response signals an exhausted rate-limit window.
fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "0")
        .unwrap_or(false)
}

/// Map an API error status onto the common taxonomy.
fn classify_status(status: StatusCode, rate_exhausted: bool, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Auth("Invalid or expired token".to_string()),
        StatusCode::FORBIDDEN if rate_exhausted => {
            Error::RateLimited("API rate limit exceeded".to_string())
        }
        StatusCode::FORBIDDEN => Error::Auth(format!("Access denied: {}", body)),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited("Too many requests".to_string()),
        StatusCode::NOT_FOUND => Error::NotFound("Resource not found".to_string()),
        StatusCode::CONFLICT => Error::Conflict(format!("Remote changed since read: {}", body)),
        // The contents API reports a stale or missing expected sha as 422.
        StatusCode::UNPROCESSABLE_ENTITY if body.contains("sha") => {
            Error::Conflict(format!("Remote changed since read: {}", body))
        }
        StatusCode::UNPROCESSABLE_ENTITY => Error::InvalidInput(format!("Rejected: {}", body)),
        s if s.is_server_error() => Error::Network(format!("Server error: {}", s)),
        s => Error::Network(format!("API error: {} - {}", s, body)),
    }
}

/// Decode contents-API base64, which arrives with embedded newlines.
fn decode_content(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::Serialization(format!("Invalid base64 content: {}", e)))
}

#[async_trait]
impl RemoteRepository for GitHubClient {
    fn provider(&self) -> &str {
        "github"
    }

    async fn authenticate(&self) -> Result<Account> {
        let url = format!("{}/user", GITHUB_API_BASE);
        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to authenticate: {}", e)))?;

        let user: UserResponse = self.handle_response(response).await?;
        Ok(Account {
            login: user.login,
            name: user.name,
        })
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let url = format!("{}/user/repos", GITHUB_API_BASE);
        let mut repos = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .get(&url)
                .query(&[
                    ("per_page", PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await
                .map_err(|e| Error::Network(format!("Failed to list repositories: {}", e)))?;

            let batch: Vec<RepoResponse> = self.handle_response(response).await?;
            let done = batch.len() < PAGE_SIZE;
            repos.extend(batch.into_iter().map(|r| Repository {
                full_name: r.full_name,
                default_branch: r.default_branch,
                private: r.private,
            }));

            if done {
                return Ok(repos);
            }
            page += 1;
        }
    }

    async fn list_branches(&self, repo: &str) -> Result<Vec<Branch>> {
        let url = format!("{}/repos/{}/branches", GITHUB_API_BASE, repo);
        let mut branches = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .get(&url)
                .query(&[
                    ("per_page", PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await
                .map_err(|e| Error::Network(format!("Failed to list branches: {}", e)))?;

            let batch: Vec<BranchResponse> = self.handle_response(response).await?;
            let done = batch.len() < PAGE_SIZE;
            branches.extend(batch.into_iter().map(|b| Branch {
                name: b.name,
                protected: b.protected,
            }));

            if done {
                return Ok(branches);
            }
            page += 1;
        }
    }

    async fn read_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
    ) -> Result<RemoteFileState> {
        let url = Self::contents_url(repo, path);
        let response = self
            .get(&url)
            .query(&[("ref", branch)])
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to read {}: {}", path, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} absent on {}@{}", path, repo, branch);
            return Ok(RemoteFileState::absent());
        }

        let file: ContentResponse = self.handle_response(response).await?;
        if file.kind.as_deref().unwrap_or("file") != "file" {
            return Err(Error::InvalidInput(format!(
                "{} is not a file on the remote",
                path
            )));
        }

        let content = match (file.content, file.encoding.as_deref()) {
            (Some(encoded), Some("base64") | None) => decode_content(&encoded)?,
            (_, Some("none")) => {
                return Err(Error::InvalidInput(format!(
                    "{} exceeds the contents API size limit",
                    path
                )))
            }
            (Some(_), Some(other)) => {
                return Err(Error::Serialization(format!(
                    "Unsupported content encoding: {}",
                    other
                )))
            }
            (None, _) => Vec::new(),
        };

        Ok(RemoteFileState::present(content, file.sha))
    }

    async fn write_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
        content: &[u8],
        message: &str,
        expected_marker: Option<&str>,
    ) -> Result<String> {
        let url = Self::contents_url(repo, path);

        let mut payload = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content),
            "branch": branch,
        });
        if let Some(sha) = expected_marker {
            payload["sha"] = serde_json::json!(sha);
        }

        let response = self
            .http
            .put(&url)
            .header(header::AUTHORIZATION, self.auth_header())
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to commit {}: {}", path, e)))?;

        let written: WriteResponse = self.handle_response(response).await?;
        Ok(written.content.sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_with_newlines() {
        // The contents API wraps base64 at 60 columns.
        let encoded = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(decode_content(encoded).unwrap(), b"hello world");
    }

    #[test]
    fn test_decode_content_rejects_garbage() {
        assert!(decode_content("not base64!!").is_err());
    }

    #[test]
    fn test_content_encode_round_trip() {
        let binary: Vec<u8> = (0u8..=255).collect();
        let encoded = BASE64.encode(&binary);
        assert_eq!(decode_content(&encoded).unwrap(), binary);
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let path = VaultPath::parse("daily notes/2024 plan.md").unwrap();
        let url = GitHubClient::contents_url("octocat/vault", &path);
        assert_eq!(
            url,
            "https://api.github.com/repos/octocat/vault/contents/daily%20notes/2024%20plan.md"
        );
    }

    #[test]
    fn test_parse_content_response() {
        let raw = r#"{
            "name": "a.md",
            "path": "a.md",
            "sha": "3b18e512dba79e4c8300dd08aeb37f8e728b8dad",
            "size": 12,
            "type": "file",
            "content": "aGVsbG8g\nd29ybGQ=\n",
            "encoding": "base64"
        }"#;
        let file: ContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(file.sha, "3b18e512dba79e4c8300dd08aeb37f8e728b8dad");
        assert_eq!(file.kind.as_deref(), Some("file"));
        assert_eq!(decode_content(file.content.as_deref().unwrap()).unwrap(), b"hello world");
    }

    #[test]
    fn test_parse_write_response() {
        let raw = r#"{
            "content": { "name": "a.md", "sha": "new-sha" },
            "commit": { "sha": "commit-sha" }
        }"#;
        let written: WriteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(written.content.sha, "new-sha");
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, false, ""),
            Error::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, true, ""),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::CONFLICT, false, ""),
            Error::Conflict(_)
        ));
        assert!(matches!(
            classify_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                false,
                r#"{"message":"a.md does not match sha"}"#
            ),
            Error::Conflict(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, false, ""),
            Error::Network(_)
        ));
    }
}
