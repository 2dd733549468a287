// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Weekly contribution statistics and the line count reduction.
///
/// Contributor statistics come from GitHub's
/// `/repos/{owner}/{repo}/stats/contributors` endpoint, which reports one
/// series of weekly additions, deletions and commits per contributor.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// GitHub API contributor statistics response structure.
#[derive(Debug, Clone, Deserialize,)]
pub(crate) struct ContributorStats
{
    #[serde(default)]
    pub weeks:  Vec<WeeklyStats,>,
    pub author: Option<Author,>,
}

/// Weekly contribution statistics as encoded by the API.
#[derive(Debug, Clone, Deserialize,)]
pub(crate) struct WeeklyStats
{
    pub w: i64,
    pub a: u64,
    pub d: u64,
    pub c: u64,
}

/// Contributor author information.
#[derive(Debug, Clone, Deserialize,)]
pub(crate) struct Author
{
    pub login: String,
}

/// Stats of a single week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct WeekStat
{
    /// Unix timestamp of the start of the week.
    pub timestamp: i64,
    pub additions: u64,
    pub deletions: u64,
    pub commits:   u64,
}

impl WeekStat
{
    /// Net lines written during the week.
    pub fn delta(&self,) -> i64
    {
        self.additions as i64 - self.deletions as i64
    }
}

impl From<&WeeklyStats,> for WeekStat
{
    fn from(week: &WeeklyStats,) -> Self
    {
        Self {
            timestamp: week.w, additions: week.a, deletions: week.d, commits: week.c,
        }
    }
}

/// Weekly history of the viewer in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepoStats
{
    /// Repository identifier in `owner/repo` form.
    pub name:  String,
    /// Ordered weekly series, empty when stats were unavailable.
    pub weeks: Vec<WeekStat,>,
}

impl RepoStats
{
    pub fn new(name: impl Into<String,>, weeks: Vec<WeekStat,>,) -> Self
    {
        Self {
            name: name.into(), weeks,
        }
    }

    /// Stats for a repository whose data could not be obtained.
    pub fn empty(name: impl Into<String,>,) -> Self
    {
        Self::new(name, Vec::new(),)
    }

    /// Sum of additions minus deletions over every week. Recomputed on each
    /// call.
    pub fn count(&self,) -> i64
    {
        self.weeks.iter().map(WeekStat::delta,).sum()
    }
}

impl std::fmt::Display for RepoStats
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "{} ({} lines over {} weeks)", self.name, self.count(), self.weeks.len())
    }
}

/// Total line count across a set of repositories.
///
/// # Example
///
/// ```
/// use hml::{RepoStats, WeekStat, calc_line_count};
///
/// let stats = vec![RepoStats::new("alice/x", vec![WeekStat {
///     timestamp: 1000,
///     additions: 50,
///     deletions: 10,
///     commits:   3,
/// }],)];
/// assert_eq!(calc_line_count(&stats,), 40);
/// assert_eq!(calc_line_count(&[],), 0);
/// ```
pub fn calc_line_count(stats: &[RepoStats],) -> i64
{
    stats.iter().map(RepoStats::count,).sum()
}

/// Selects the weekly series of `login` from a contributor list.
///
/// Returns empty stats when the login does not appear.
pub(crate) fn select_contributor(
    repo: &str,
    contributors: &[ContributorStats],
    login: &str,
) -> RepoStats
{
    contributors
        .iter()
        .find(|entry| entry.author.as_ref().is_some_and(|author| author.login == login,),)
        .map(|entry| RepoStats::new(repo, entry.weeks.iter().map(WeekStat::from,).collect(),),)
        .unwrap_or_else(|| RepoStats::empty(repo,),)
}

/// Alternate origin of repository stats, mostly used to drive the engine
/// from canned data.
#[async_trait]
pub trait StatsSource: Send + Sync
{
    async fn collect(&self,) -> Result<Vec<RepoStats,>, Error,>;
}

/// [`StatsSource`] yielding a fixed list.
#[derive(Debug, Clone, Default,)]
pub struct StaticStatsSource
{
    stats: Vec<RepoStats,>,
}

impl StaticStatsSource
{
    pub fn new(stats: Vec<RepoStats,>,) -> Self
    {
        Self {
            stats,
        }
    }
}

#[async_trait]
impl StatsSource for StaticStatsSource
{
    async fn collect(&self,) -> Result<Vec<RepoStats,>, Error,>
    {
        Ok(self.stats.clone(),)
    }
}
