// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Splices the rendered statistics into a README.
///
/// The generated block lives between two marker lines. When a README has
/// neither marker, both are appended at the end so the first run creates the
/// section.
use std::{fs, path::Path, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    config::RepositorySlug,
    error::{Error, io_error},
    retry::{RetryConfig, retry_with_backoff},
    transport::{HttpTransport, RequestConfig},
    viewer::Token
};

/// Line opening the generated section.
pub const START_MARKER: &str = "<!-- START README.md STATS GENERATOR -->";
/// Line closing the generated section.
pub const END_MARKER: &str = "<!-- END README.md STATS GENERATOR -->";

const DEFAULT_README_PATH: &str = "README.md";
const MENTIONED_ISSUES: usize = 3;

/// Locates the marker lines, appending both when neither exists.
///
/// Returns the indices of the start and end markers.
///
/// # Errors
///
/// Returns [`Error::Validation`] when only one marker is present or when the
/// start marker follows the end marker.
pub fn readme_bounds(lines: &mut Vec<String>) -> Result<(usize, usize), Error> {
    let (start, end) = match (marker_line(lines, START_MARKER), marker_line(lines, END_MARKER)) {
        (None, None) => {
            debug!("README has no stats markers, appending them");
            lines.push(START_MARKER.to_owned());
            lines.push(END_MARKER.to_owned());
            (lines.len() - 2, lines.len() - 1)
        }
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(Error::validation(format!(
                "README must contain both `{START_MARKER}` and `{END_MARKER}`"
            )));
        }
    };

    if start > end {
        return Err(Error::validation(format!(
            "README start marker was placed after the end marker: {END_MARKER} ... {START_MARKER}"
        )));
    }

    Ok((start, end))
}

fn marker_line(lines: &[String], marker: &str) -> Option<usize> {
    lines.iter().position(|line| line.trim() == marker)
}

/// Replaces the lines between the markers with `markdown`.
///
/// # Errors
///
/// Propagates marker errors from [`readme_bounds`].
///
/// # Example
///
/// ```
/// use hml::splice_readme;
///
/// let readme = "# Me\n<!-- START README.md STATS GENERATOR -->\nold\n<!-- END README.md STATS GENERATOR -->";
/// let updated = splice_readme(readme, "new")?;
/// assert_eq!(
///     updated,
///     "# Me\n<!-- START README.md STATS GENERATOR -->\nnew\n<!-- END README.md STATS GENERATOR -->"
/// );
/// # Ok::<(), hml::Error>(())
/// ```
pub fn splice_readme(readme: &str, markdown: &str) -> Result<String, Error> {
    let mut lines: Vec<String> = readme.split('\n').map(str::to_owned).collect();
    let (start, end) = readme_bounds(&mut lines)?;

    let mut spliced: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    spliced.extend(lines[..=start].iter().map(String::as_str));
    spliced.push(markdown);
    spliced.extend(lines[end..].iter().map(String::as_str));

    Ok(spliced.join("\n"))
}

/// Commit message of a README build.
///
/// The first pool issues are mentioned so the commit links back to them.
pub fn commit_message(mentions: &[u64], at: DateTime<Utc>) -> String {
    let stamp = at.format("%d %B %Y %H:%M:%S");
    let issues: Vec<String> = mentions
        .iter()
        .take(MENTIONED_ISSUES)
        .map(|n| format!("#{n}"))
        .collect();

    if issues.is_empty() {
        format!("`README.md` build on `{stamp}`")
    } else {
        format!("({}) `README.md` build on `{stamp}`", issues.join(", "))
    }
}

/// Splices `markdown` into the README at `path`.
///
/// Returns `true` when the file changed.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read or written and
/// [`Error::Validation`] for misplaced markers.
pub fn update_local_readme(path: &Path, markdown: &str) -> Result<bool, Error> {
    info!("Reading README from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;

    let updated = splice_readme(&content, markdown)?;
    if updated == content {
        info!("No changes to README");
        return Ok(false);
    }

    fs::write(path, updated).map_err(|e| io_error(path, e))?;
    info!("README updated at {}", path.display());
    Ok(true)
}

#[derive(Debug, Deserialize)]
struct ReadmeDocument {
    content: String,
    sha:     String,
    #[serde(default)]
    path:    Option<String>
}

/// Commit produced by [`ReadmePublisher::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeCommit {
    pub path:    String,
    pub message: String
}

/// Commits rendered statistics to the README of a repository.
pub struct ReadmePublisher {
    transport:  Arc<dyn HttpTransport>,
    base_url:   String,
    repository: RepositorySlug,
    token:      Token,
    retry:      RetryConfig
}

impl ReadmePublisher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        repository: RepositorySlug,
        token: Token
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_owned(),
            repository,
            token,
            retry: RetryConfig::default()
        }
    }

    /// Overrides how often the fetch-splice-commit cycle is attempted.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches the README, splices `markdown` in and commits the result.
    ///
    /// A rejected commit (for instance a stale `sha`) restarts the whole
    /// cycle so the next attempt works on the latest README.
    ///
    /// # Errors
    ///
    /// Returns the last failure once every attempt has been used.
    pub async fn publish(&self, markdown: &str, mentions: &[u64]) -> Result<ReadmeCommit, Error> {
        retry_with_backoff(&self.retry, "README publication", || {
            self.publish_once(markdown, mentions)
        })
        .await
    }

    async fn publish_once(&self, markdown: &str, mentions: &[u64]) -> Result<ReadmeCommit, Error> {
        let readme_url = format!("{}/repos/{}/readme", self.base_url, self.repository);
        let response = self
            .transport
            .get(&readme_url, RequestConfig::with_token(self.token.expose()))
            .await?;
        if !response.is_success() {
            return Err(Error::service(format!(
                "failed to fetch README of {}: status {}",
                self.repository, response.status
            )));
        }

        let document: ReadmeDocument = serde_json::from_str(&response.body)?;
        let current = decode_content(&document.content)?;
        let updated = splice_readme(&current, markdown)?;

        let path = document
            .path
            .unwrap_or_else(|| DEFAULT_README_PATH.to_owned());
        let message = commit_message(mentions, Utc::now());
        let body = json!({
            "message": message,
            "content": STANDARD.encode(updated.as_bytes()),
            "sha": document.sha,
        });

        let contents_url = format!("{}/repos/{}/contents/{path}", self.base_url, self.repository);
        let response = self
            .transport
            .put(
                &contents_url,
                RequestConfig::with_token(self.token.expose()).body(body)
            )
            .await?;
        if !response.is_success() {
            return Err(Error::service(format!(
                "failed to commit {path} to {}: status {}",
                self.repository, response.status
            )));
        }

        info!("Committed {} to {}", path, self.repository);
        Ok(ReadmeCommit {
            path,
            message
        })
    }
}

fn decode_content(content: &str) -> Result<String, Error> {
    let compact: String = content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Error::protocol(format!("README content is not base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::protocol(format!("README is not UTF-8: {e}")))
}
