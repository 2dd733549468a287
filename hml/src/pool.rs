// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Issue-per-user storage of computed line counts.
///
/// Every user owns one "pool issue" in the storage repository, labelled with
/// the user's label (`u: @login`) and the shared pool label. The issue body
/// holds a marker line followed by the JSON record.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    config::RepositorySlug,
    error::Error,
    transport::{HttpResponse, HttpTransport, RequestConfig},
    viewer::{Token, Viewer},
};

/// Label shared by every pool issue.
pub const POOL_ISSUE_LABEL: &str = "t: Pool Issue";
/// Issues listed per page when reading the pool.
pub const POOL_PAGE_SIZE: usize = 100;

const USER_LABEL_COLOR: &str = "000000";
const POOL_LABEL_COLOR: &str = "003333";
const USER_LABEL_DESCRIPTION: &str = "Hey! This is your tag";
const POOL_LABEL_DESCRIPTION: &str = "Issues are just to hold data!";
const LABEL_ALREADY_EXISTS_STATUS: u16 = 422;
const RECORD_MARKER: &str = "<!-- hml pool record: do not edit the line below -->";

/// Label identifying the pool issue of `login`.
pub fn user_label(login: &str,) -> String
{
    format!("u: @{login}")
}

/// Profile data stored with a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct PoolUser
{
    pub login:      String,
    pub avatar_url: String,
    pub html_url:   String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct PoolStats
{
    #[serde(rename = "lineCount")]
    pub line_count: i64,
}

/// Content of a pool issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct PoolRecord
{
    pub user:  PoolUser,
    pub stats: PoolStats,
}

impl PoolRecord
{
    pub fn new(viewer: &Viewer, line_count: i64,) -> Self
    {
        Self {
            user:  PoolUser {
                login:      viewer.login.clone(),
                avatar_url: viewer.avatar_url.clone(),
                html_url:   viewer.html_url.clone(),
            },
            stats: PoolStats {
                line_count,
            },
        }
    }

    /// Serializes the record into an issue body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when serialization fails.
    pub fn to_issue_body(&self,) -> Result<String, Error,>
    {
        Ok(format!("{RECORD_MARKER}\n{}", serde_json::to_string(self,)?),)
    }

    /// Reads a record from the second line of an issue body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the line is missing and
    /// [`Error::Decode`] when it is not a record.
    pub fn from_issue_body(body: &str,) -> Result<Self, Error,>
    {
        let line = body
            .lines()
            .nth(1,)
            .ok_or_else(|| Error::validation("pool issue body has no record line",),)?;
        Ok(serde_json::from_str(line.trim(),)?,)
    }
}

/// Result of a label creation attempt.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum LabelOutcome
{
    Created,
    AlreadyExists,
    Failed(String,),
}

/// Result of writing a user's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize,)]
#[serde(tag = "action", content = "issue", rename_all = "snake_case")]
pub enum PoolWrite
{
    Created(u64,),
    Updated(u64,),
}

impl std::fmt::Display for PoolWrite
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        match self {
            Self::Created(number,) => write!(f, "created pool issue #{number}"),
            Self::Updated(number,) => write!(f, "updated pool issue #{number}"),
        }
    }
}

/// Issue as returned by the issues API.
#[derive(Debug, Clone, Deserialize,)]
pub struct PoolIssue
{
    pub number: u64,
    #[serde(default)]
    pub body:   Option<String,>,
}

/// Record read back from the pool, with the issue it came from.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct StoredRecord
{
    pub issue:  u64,
    pub record: PoolRecord,
}

/// Reads and writes pool issues in one repository.
pub struct PoolStore
{
    transport:  Arc<dyn HttpTransport,>,
    base_url:   String,
    repository: RepositorySlug,
    token:      Token,
}

impl PoolStore
{
    pub fn new(
        transport: Arc<dyn HttpTransport,>,
        base_url: &str,
        repository: RepositorySlug,
        token: Token,
    ) -> Self
    {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/',).to_owned(),
            repository,
            token,
        }
    }

    fn repo_url(&self, path: &str,) -> String
    {
        format!("{}/repos/{}{path}", self.base_url, self.repository)
    }

    fn request(&self,) -> RequestConfig
    {
        RequestConfig::with_token(self.token.expose(),)
    }

    /// Creates a label unless it already exists.
    pub async fn ensure_label(&self, name: &str, description: &str, color: &str,) -> LabelOutcome
    {
        let body = json!({ "name": name, "color": color, "description": description });
        match self.transport.post(&self.repo_url("/labels",), self.request().body(body,),).await {
            Ok(response,) if response.status == 201 => {
                debug!("Created label '{}' in {}", name, self.repository);
                LabelOutcome::Created
            }
            Ok(response,) if response.status == LABEL_ALREADY_EXISTS_STATUS => {
                LabelOutcome::AlreadyExists
            }
            Ok(response,) => LabelOutcome::Failed(describe_failure(&response,),),
            Err(error,) => LabelOutcome::Failed(error.to_string(),),
        }
    }

    /// Creates the shared pool label unless it already exists.
    pub async fn ensure_pool_label(&self,) -> LabelOutcome
    {
        self.ensure_label(POOL_ISSUE_LABEL, POOL_LABEL_DESCRIPTION, POOL_LABEL_COLOR,).await
    }

    /// Lists open issues carrying all of `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] for non-success answers and propagates
    /// transport and decoding failures.
    pub async fn search_issues_by_labels(
        &self,
        labels: &[&str],
        per_page: usize,
        page: u32,
    ) -> Result<Vec<PoolIssue,>, Error,>
    {
        let url = url::Url::parse_with_params(&self.repo_url("/issues",), &[
            ("labels", labels.join(",",),),
            ("per_page", per_page.to_string(),),
            ("page", page.to_string(),),
        ],)
        .map_err(|e| Error::validation(format!("invalid issues URL: {e}"),),)?;

        let response = self.transport.get(url.as_str(), self.request(),).await?;
        if !response.is_success() {
            return Err(Error::service(format!(
                "failed to search issues in {}: {}",
                self.repository,
                describe_failure(&response,)
            ),),);
        }

        Ok(serde_json::from_str(&response.body,)?,)
    }

    /// Opens the pool issue of a first-time user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when GitHub refuses the issue.
    pub async fn create_pool_issue(&self, record: &PoolRecord,) -> Result<u64, Error,>
    {
        let label = user_label(&record.user.login,);
        let body = json!({
            "title": format!("To {label}"),
            "body": record.to_issue_body()?,
            "assignees": [self.repository.owner()],
            "labels": [label, POOL_ISSUE_LABEL],
        });

        let response = self.transport.post(&self.repo_url("/issues",), self.request().body(body,),).await?;
        if response.status != 201 {
            return Err(Error::service(format!(
                "failed to create pool issue: {}",
                describe_failure(&response,)
            ),),);
        }

        let issue: PoolIssue = serde_json::from_str(&response.body,)?;
        Ok(issue.number,)
    }

    /// Replaces the record held by an existing pool issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when GitHub refuses the update.
    pub async fn update_pool_issue(&self, number: u64, record: &PoolRecord,) -> Result<u64, Error,>
    {
        let body = json!({ "body": record.to_issue_body()? });
        let url = self.repo_url(&format!("/issues/{number}"),);

        let response = self.transport.patch(&url, self.request().body(body,),).await?;
        if !response.is_success() {
            return Err(Error::service(format!(
                "failed to update pool issue #{number}: {}",
                describe_failure(&response,)
            ),),);
        }

        Ok(number,)
    }

    /// Stores `line_count` for `viewer`, creating the issue on first use.
    ///
    /// # Errors
    ///
    /// Fails when a label cannot be created or an issue request is refused.
    pub async fn upsert_record(&self, viewer: &Viewer, line_count: i64,) -> Result<PoolWrite, Error,>
    {
        let label = user_label(&viewer.login,);

        for (name, outcome,) in [
            (label.as_str(), self.ensure_label(&label, USER_LABEL_DESCRIPTION, USER_LABEL_COLOR,).await,),
            (POOL_ISSUE_LABEL, self.ensure_pool_label().await,),
        ] {
            if let LabelOutcome::Failed(reason,) = outcome {
                return Err(Error::service(format!("failed to create label '{name}': {reason}"),),);
            }
        }

        let record = PoolRecord::new(viewer, line_count,);
        let existing = self.search_issues_by_labels(&[label.as_str()], 1, 1,).await?;

        let outcome = match existing.first() {
            Some(issue,) => PoolWrite::Updated(self.update_pool_issue(issue.number, &record,).await?,),
            None => PoolWrite::Created(self.create_pool_issue(&record,).await?,),
        };
        info!("{} for {} ({} lines)", outcome, viewer.login, line_count);

        Ok(outcome,)
    }

    /// Reads every pool record, newest issues first as listed by GitHub.
    ///
    /// Issues whose body is not a record are skipped.
    ///
    /// # Errors
    ///
    /// Propagates listing failures.
    pub async fn fetch_pool_records(&self,) -> Result<Vec<StoredRecord,>, Error,>
    {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let issues = self.search_issues_by_labels(&[POOL_ISSUE_LABEL], POOL_PAGE_SIZE, page,).await?;
            let has_more = issues.len() == POOL_PAGE_SIZE;

            for issue in issues {
                match issue.body.as_deref().map(PoolRecord::from_issue_body,) {
                    Some(Ok(record,),) => records.push(StoredRecord {
                        issue: issue.number,
                        record,
                    },),
                    Some(Err(error,),) => warn!("Skipping pool issue #{}: {}", issue.number, error),
                    None => warn!("Skipping pool issue #{}: empty body", issue.number),
                }
            }

            if !has_more {
                break;
            }
            page += 1;
        }

        debug!("Read {} pool records from {}", records.len(), self.repository);
        Ok(records,)
    }
}

fn describe_failure(response: &HttpResponse,) -> String
{
    let message = serde_json::from_str::<serde_json::Value,>(&response.body,)
        .ok()
        .and_then(|document| document.get("message",).and_then(|m| m.as_str(),).map(str::to_owned,),)
        .unwrap_or_else(|| response.body.chars().take(200,).collect(),);
    format!("status {}: {message}", response.status)
}
