//! Remote publisher: upserts the serialized blueprint as a single
//! committed file via the GitHub contents API.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::blueprint::{serialize_blueprint, Blueprint};
use crate::constants;
use crate::error::{ArchitectError, Result};

const USER_AGENT: &str = concat!("architect/", env!("CARGO_PKG_VERSION"));

/// The stored version of a file in the remote repository.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    /// Opaque concurrency token; required to safely overwrite this
    /// version.
    pub sha: String,
}

/// Client for a GitHub-style repository contents API.
pub struct RepoClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl RepoClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(constants::GITHUB_API_BASE.as_str(), token)
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_api_base(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    fn contents_url(&self, repo: &str, path: &str) -> String {
        format!("{}/repos/{}/contents/{}", self.api_base, repo, path)
    }

    /// Fetch the stored version of `path` on `branch`.
    pub async fn fetch_file(&self, repo: &str, path: &str, branch: &str) -> Result<RemoteFile> {
        let response = self
            .http
            .get(self.contents_url(repo, path))
            .query(&[("ref", branch)])
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(constants::http_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ArchitectError::remote(status.as_u16(), text));
        }
        Ok(response.json().await?)
    }

    /// Create `path` fresh on `branch`.
    pub async fn create_file(
        &self,
        repo: &str,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<()> {
        let body = json!({
            "message": message,
            "content": BASE64.encode(content),
            "branch": branch,
        });
        self.put_contents(repo, path, body).await
    }

    /// Overwrite `path` on `branch`. `sha` must match the stored
    /// version; the service rejects a stale token.
    pub async fn update_file(
        &self,
        repo: &str,
        path: &str,
        message: &str,
        content: &str,
        sha: &str,
        branch: &str,
    ) -> Result<()> {
        let body = json!({
            "message": message,
            "content": BASE64.encode(content),
            "sha": sha,
            "branch": branch,
        });
        self.put_contents(repo, path, body).await
    }

    async fn put_contents(&self, repo: &str, path: &str, body: serde_json::Value) -> Result<()> {
        let response = self
            .http
            .put(self.contents_url(repo, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(constants::http_timeout())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ArchitectError::remote(status.as_u16(), text));
        }
        Ok(())
    }

    /// Create or update the blueprint file in `repo` on `branch`.
    ///
    /// The whole mapping lands as one commit. A stale concurrency
    /// token or any other remote failure is surfaced unchanged; this
    /// client does not retry the conflict.
    pub async fn publish_blueprint(
        &self,
        repo: &str,
        blueprint: &Blueprint,
        commit_message: &str,
        branch: &str,
    ) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(ArchitectError::MissingCredential("GitHub token"));
        }
        if repo.trim().is_empty() {
            return Err(ArchitectError::MissingTarget);
        }

        let content = serialize_blueprint(blueprint);
        let path = constants::BLUEPRINT_FILE_NAME;

        match self.fetch_file(repo, path, branch).await {
            Ok(existing) => {
                self.update_file(
                    repo,
                    &existing.path,
                    commit_message,
                    &content,
                    &existing.sha,
                    branch,
                )
                .await?;
                info!("Updated {} in {} on {}", path, repo, branch);
            }
            Err(e) if e.is_not_found() => {
                self.create_file(repo, path, commit_message, &content, branch)
                    .await?;
                info!("Created {} in {} on {}", path, repo, branch);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
