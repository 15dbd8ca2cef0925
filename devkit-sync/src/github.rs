//! [`HostingPort`] over the GitHub REST API (v3), using a blocking `ureq`
//! agent.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use devkit_core::{RepoSlug, RunSettings};

use crate::error::HostingError;
use crate::hosting::{
    HostingPort, MergeOutcome, NewPullRequest, PullRequest, PullRequestFilter, PullRequestUpdate,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Overrides [`DEFAULT_API_URL`], e.g. for GitHub Enterprise.
pub const API_URL_ENV: &str = "GITHUB_API_URL";

const USER_AGENT: &str = concat!("devkit/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github.v3+json";
const PAGE_SIZE: &str = "100";

pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
    /// Login owning the forks.
    fork_owner: String,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>, fork_owner: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            fork_owner: fork_owner.into(),
        }
    }

    /// Client for the bot account in `settings`, honouring [`API_URL_ENV`].
    pub fn from_settings(settings: &RunSettings) -> Self {
        let api_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if settings.auth_token.is_none() {
            tracing::warn!("no API token configured; GitHub calls are unauthenticated");
        }
        Self::new(api_url, settings.auth_token.clone(), settings.bot.user.clone())
    }

    fn repo_url(&self, owner: &str, name: &str, tail: &str) -> String {
        format!("{}/repos/{owner}/{name}{tail}", self.api_url)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self.agent.request(method, url).set("Accept", ACCEPT);
        match &self.token {
            Some(token) => req.set("Authorization", &format!("token {token}")),
            None => req,
        }
    }

    fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, HostingError> {
        response.into_json::<T>().map_err(|source| HostingError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Fold a `ureq` failure into a [`HostingError`], lifting GitHub's JSON
/// `message` out of error bodies.
fn map_error(method: &str, url: &str, err: ureq::Error) -> HostingError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            HostingError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status,
                message: api_message(&body),
            }
        }
        ureq::Error::Transport(transport) => HostingError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Status codes GitHub uses to refuse a merge for content reasons.
fn is_merge_conflict(err: &HostingError) -> bool {
    matches!(err.status(), Some(405) | Some(409))
}

fn merged_sha(body: &Value) -> Option<String> {
    body.get("sha").and_then(Value::as_str).map(str::to_string)
}

/// A merge response without a commit SHA means base already had head.
fn merge_outcome(body: &Value) -> MergeOutcome {
    match merged_sha(body) {
        Some(sha) => MergeOutcome::Merged { sha },
        None => MergeOutcome::NothingToMerge,
    }
}

/// Body of `PUT /pulls/{n}/merge`: a plain merge commit carrying
/// `message`, refused by GitHub if head moved past `sha`.
fn merge_pull_request_body(message: &str, sha: &str) -> Value {
    json!({ "commit_message": message, "sha": sha, "merge_method": "merge" })
}

/// Target of the `rel="next"` entry in a `Link` header, if any.
fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|p| p.trim() == r#"rel="next""#);
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        is_next.then(|| target.to_string())
    })
}

impl HostingPort for GithubClient {
    fn create_fork(&self, upstream: &RepoSlug) -> Result<(), HostingError> {
        let url = self.repo_url(&upstream.owner.0, &upstream.name.0, "/forks");
        self.request("POST", &url)
            .send_json(json!({}))
            .map_err(|e| map_error("POST", &url, e))?;
        Ok(())
    }

    fn delete_fork(&self, upstream: &RepoSlug) -> Result<(), HostingError> {
        let url = self.repo_url(&self.fork_owner, &upstream.name.0, "");
        self.request("DELETE", &url)
            .call()
            .map_err(|e| map_error("DELETE", &url, e))?;
        Ok(())
    }

    fn list_pull_requests(
        &self,
        upstream: &RepoSlug,
        filter: &PullRequestFilter,
    ) -> Result<Vec<PullRequest>, HostingError> {
        let url = self.repo_url(&upstream.owner.0, &upstream.name.0, "/pulls");
        let mut req = self.request("GET", &url).query("per_page", PAGE_SIZE);
        for (key, value) in filter.query_pairs() {
            req = req.query(key, &value);
        }
        let mut response = req.call().map_err(|e| map_error("GET", &url, e))?;
        let mut page_url = url;
        let mut pulls = Vec::new();
        loop {
            let next = response.header("Link").and_then(next_page_url);
            let page: Vec<PullRequest> = Self::decode(&page_url, response)?;
            pulls.extend(page);
            match next {
                Some(next) => {
                    response = self
                        .request("GET", &next)
                        .call()
                        .map_err(|e| map_error("GET", &next, e))?;
                    page_url = next;
                }
                None => return Ok(pulls),
            }
        }
    }

    fn create_pull_request(
        &self,
        upstream: &RepoSlug,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError> {
        let url = self.repo_url(&upstream.owner.0, &upstream.name.0, "/pulls");
        let response = self
            .request("POST", &url)
            .send_json(request)
            .map_err(|e| map_error("POST", &url, e))?;
        Self::decode(&url, response)
    }

    fn update_pull_request(
        &self,
        upstream: &RepoSlug,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, HostingError> {
        let url = self.repo_url(&upstream.owner.0, &upstream.name.0, &format!("/pulls/{number}"));
        let response = self
            .request("PATCH", &url)
            .send_json(update)
            .map_err(|e| map_error("PATCH", &url, e))?;
        Self::decode(&url, response)
    }

    fn merge_branches(
        &self,
        upstream: &RepoSlug,
        base: &str,
        head: &str,
        message: &str,
    ) -> Result<MergeOutcome, HostingError> {
        let url = self.repo_url(&upstream.owner.0, &upstream.name.0, "/merges");
        let body = json!({ "base": base, "head": head, "commit_message": message });
        let response = match self.request("POST", &url).send_json(body) {
            Ok(response) => response,
            Err(e) => {
                let err = map_error("POST", &url, e);
                return if is_merge_conflict(&err) {
                    Ok(MergeOutcome::Conflict)
                } else {
                    Err(err)
                };
            }
        };
        if response.status() == 204 {
            return Ok(MergeOutcome::NothingToMerge);
        }
        let body: Value = Self::decode(&url, response)?;
        Ok(merge_outcome(&body))
    }

    fn merge_pull_request(
        &self,
        upstream: &RepoSlug,
        number: u64,
        message: &str,
        sha: &str,
    ) -> Result<MergeOutcome, HostingError> {
        let url = self.repo_url(
            &upstream.owner.0,
            &upstream.name.0,
            &format!("/pulls/{number}/merge"),
        );
        let response = match self
            .request("PUT", &url)
            .send_json(merge_pull_request_body(message, sha))
        {
            Ok(response) => response,
            Err(e) => {
                let err = map_error("PUT", &url, e);
                return if is_merge_conflict(&err) {
                    Ok(MergeOutcome::Conflict)
                } else {
                    Err(err)
                };
            }
        };
        let body: Value = Self::decode(&url, response)?;
        Ok(merge_outcome(&body))
    }
}
