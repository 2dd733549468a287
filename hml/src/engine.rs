// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Line count aggregation engine.
//!
//! A [`StatsEngine`] is built for one token and one aggregation run. It
//! validates the token once, lists the viewer's owned and contributed
//! repositories, fetches every repository's contributor statistics
//! concurrently and leaves the final reduction to [`calc_line_count`].
//!
//! Repository level faults (stats still being computed, malformed bodies,
//! transport errors) never abort a run: the repository simply contributes
//! empty stats. Token failures and listing failures do abort it.

use std::{sync::Arc, time::Duration};

use futures::future::{join_all, try_join, try_join_all};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    executor::{QueryExecutor, TransportQueryExecutor},
    pagination::{PageTermination, list_repositories},
    query::Resolver,
    retry::{RetryConfig, retry_with_backoff},
    stats::{ContributorStats, RepoStats, StatsSource, calc_line_count, select_contributor},
    transport::{HttpTransport, OctocrabTransport, RequestConfig},
    viewer::{Token, TokenValidator, Viewer},
};

/// Public GitHub REST API root.
pub const GITHUB_BASE_URL: &str = "https://api.github.com";
/// Public GitHub GraphQL endpoint.
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Frozen engine settings. Build through [`EngineConfig::builder`].
#[derive(Clone,)]
pub struct EngineConfig
{
    token:            Token,
    transport:        Arc<dyn HttpTransport,>,
    executor:         Arc<dyn QueryExecutor,>,
    base_url:         String,
    graphql_url:      String,
    page_termination: PageTermination,
    stats_retry:      Option<RetryConfig,>,
}

impl std::fmt::Debug for EngineConfig
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("EngineConfig",)
            .field("token", &self.token,)
            .field("base_url", &self.base_url,)
            .field("graphql_url", &self.graphql_url,)
            .field("page_termination", &self.page_termination,)
            .field("stats_retry", &self.stats_retry,)
            .finish_non_exhaustive()
    }
}

impl EngineConfig
{
    pub fn builder() -> EngineConfigBuilder
    {
        EngineConfigBuilder::default()
    }

    pub fn token(&self,) -> &Token
    {
        &self.token
    }

    pub fn base_url(&self,) -> &str
    {
        &self.base_url
    }

    pub fn graphql_url(&self,) -> &str
    {
        &self.graphql_url
    }

    pub fn transport(&self,) -> Arc<dyn HttpTransport,>
    {
        self.transport.clone()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Default,)]
pub struct EngineConfigBuilder
{
    token:            Option<String,>,
    transport:        Option<Arc<dyn HttpTransport,>,>,
    executor:         Option<Arc<dyn QueryExecutor,>,>,
    base_url:         Option<String,>,
    graphql_url:      Option<String,>,
    page_termination: PageTermination,
    stats_retry:      Option<RetryConfig,>,
    timeout:          Option<Duration,>,
}

impl EngineConfigBuilder
{
    #[must_use]
    pub fn token(mut self, token: impl Into<String,>,) -> Self
    {
        self.token = Some(token.into(),);
        self
    }

    /// Replaces the HTTP transport used for REST calls (and for GraphQL when
    /// no executor is supplied).
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport,>,) -> Self
    {
        self.transport = Some(transport,);
        self
    }

    /// Replaces the GraphQL query executor.
    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn QueryExecutor,>,) -> Self
    {
        self.executor = Some(executor,);
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String,>,) -> Self
    {
        self.base_url = Some(url.into(),);
        self
    }

    #[must_use]
    pub fn graphql_url(mut self, url: impl Into<String,>,) -> Self
    {
        self.graphql_url = Some(url.into(),);
        self
    }

    #[must_use]
    pub fn page_termination(mut self, termination: PageTermination,) -> Self
    {
        self.page_termination = termination;
        self
    }

    /// Polls repositories whose statistics are still being computed instead
    /// of counting them as empty straight away.
    #[must_use]
    pub fn stats_retry(mut self, retry: RetryConfig,) -> Self
    {
        self.stats_retry = Some(retry,);
        self
    }

    /// Bounds connect and read time of the default transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration,) -> Self
    {
        self.timeout = Some(timeout,);
        self
    }

    /// Validates the settings and freezes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] when no non-blank token was supplied,
    /// [`Error::Validation`] for malformed URLs and [`Error::Transport`] when
    /// the default transport cannot be built.
    pub fn build(self,) -> Result<EngineConfig, Error,>
    {
        let token = Token::new(self.token.unwrap_or_default(),)?;
        let base_url = normalize_url(self.base_url.as_deref().unwrap_or(GITHUB_BASE_URL,),)?;
        let graphql_url =
            normalize_url(self.graphql_url.as_deref().unwrap_or(GITHUB_GRAPHQL_URL,),)?;

        let transport: Arc<dyn HttpTransport,> = match self.transport {
            Some(transport,) => transport,
            None => Arc::new(OctocrabTransport::new(self.timeout,)?,),
        };
        let executor: Arc<dyn QueryExecutor,> = match self.executor {
            Some(executor,) => executor,
            None => Arc::new(TransportQueryExecutor::new(transport.clone(),),),
        };

        Ok(EngineConfig {
            token,
            transport,
            executor,
            base_url,
            graphql_url,
            page_termination: self.page_termination,
            stats_retry: self.stats_retry,
        },)
    }
}

fn normalize_url(raw: &str,) -> Result<String, Error,>
{
    let trimmed = raw.trim().trim_end_matches('/',);
    let uri: http::Uri =
        trimmed.parse().map_err(|e| Error::validation(format!("invalid URL '{raw}': {e}"),),)?;

    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(Error::validation(format!("URL '{raw}' must be absolute"),),);
    }

    Ok(trimmed.to_owned(),)
}

/// Outcome of one contributor-stats request.
enum ContributorsFetch
{
    Ready(Vec<ContributorStats,>,),
    /// GitHub is still computing the statistics.
    Pending(u16,),
    Unavailable(String,),
}

/// Stats aggregation engine bound to one token.
pub struct StatsEngine
{
    config:    EngineConfig,
    validator: TokenValidator,
    sources:   Vec<Arc<dyn StatsSource,>,>,
}

impl StatsEngine
{
    /// Creates an engine aggregating the viewer's owned and contributed
    /// repositories.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hml::{EngineConfig, StatsEngine};
    ///
    /// # async fn example() -> Result<(), hml::Error> {
    /// let engine = StatsEngine::new(EngineConfig::builder().token("ghp_token",).build()?,);
    /// let stats = engine.generate_stats().await?;
    /// println!("{}", StatsEngine::calc_line_count(&stats,));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: EngineConfig,) -> Self
    {
        Self::with_sources(config, Vec::new(),)
    }

    /// Creates an engine whose [`generate_stats`](Self::generate_stats)
    /// collects `sources` instead of the two default resolvers. An empty list
    /// keeps the defaults.
    pub fn with_sources(config: EngineConfig, sources: Vec<Arc<dyn StatsSource,>,>,) -> Self
    {
        let validator =
            TokenValidator::new(config.transport.clone(), &config.base_url, config.token.clone(),);

        Self {
            config,
            validator,
            sources,
        }
    }

    pub fn config(&self,) -> &EngineConfig
    {
        &self.config
    }

    /// Returns the validated viewer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadToken`] when the token is rejected.
    pub async fn viewer(&self,) -> Result<&Viewer, Error,>
    {
        self.validator.ensure_valid().await
    }

    /// Stats of every repository owned by the viewer.
    ///
    /// The result order does not follow the listing order.
    ///
    /// # Errors
    ///
    /// Fails on token rejection or listing failures only.
    pub async fn generate_stats_of_my_repos(&self,) -> Result<Vec<RepoStats,>, Error,>
    {
        self.generate_stats_of_resolver(Resolver::Repositories,).await
    }

    /// Stats of every repository the viewer contributed to.
    ///
    /// # Errors
    ///
    /// Fails on token rejection or listing failures only.
    pub async fn generate_stats_of_contributed_repos(&self,) -> Result<Vec<RepoStats,>, Error,>
    {
        self.generate_stats_of_resolver(Resolver::RepositoriesContributedTo,).await
    }

    /// Main entry point: validates the token, then runs every stats source
    /// concurrently and flattens their results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadToken`] before any listing request when the token
    /// is rejected, and propagates source failures.
    pub async fn generate_stats(&self,) -> Result<Vec<RepoStats,>, Error,>
    {
        self.validator.ensure_valid().await?;

        let stats: Vec<RepoStats,> = if self.sources.is_empty() {
            let (mine, contributed,) = try_join(
                self.generate_stats_of_my_repos(),
                self.generate_stats_of_contributed_repos(),
            )
            .await?;
            mine.into_iter().chain(contributed,).collect()
        } else {
            let batches = try_join_all(self.sources.iter().map(|source| source.collect(),),).await?;
            batches.into_iter().flatten().collect()
        };

        info!("Collected stats for {} repositories", stats.len());
        Ok(stats,)
    }

    /// Stats of a single `owner/repo` for the viewer.
    ///
    /// # Errors
    ///
    /// Only token validation can fail; repository faults yield empty stats.
    pub async fn generate_stats_of(&self, repo: &str,) -> Result<RepoStats, Error,>
    {
        let viewer = self.validator.ensure_valid().await?;
        Ok(self.fetch_repo_stats(repo, &viewer.login,).await,)
    }

    /// Sum of [`RepoStats::count`] over `stats`.
    pub fn calc_line_count(stats: &[RepoStats],) -> i64
    {
        calc_line_count(stats,)
    }

    async fn generate_stats_of_resolver(
        &self,
        resolver: Resolver,
    ) -> Result<Vec<RepoStats,>, Error,>
    {
        let viewer = self.validator.ensure_valid().await?;

        let repositories = list_repositories(
            self.config.executor.as_ref(),
            &self.config.graphql_url,
            self.config.token.expose(),
            resolver,
            self.config.page_termination,
        )
        .await?;
        info!("{} lists {} repositories for {}", resolver, repositories.len(), viewer.login);

        Ok(join_all(repositories.iter().map(|repo| self.fetch_repo_stats(repo, &viewer.login,),),)
            .await,)
    }

    async fn fetch_repo_stats(&self, repo: &str, login: &str,) -> RepoStats
    {
        let url = format!("{}/repos/{repo}/stats/contributors", self.config.base_url);

        let outcome = match &self.config.stats_retry {
            None => self.fetch_contributors(&url,).await,
            Some(retry,) => {
                retry_with_backoff(retry, &format!("contributor stats for {repo}"), || async {
                    match self.fetch_contributors(&url,).await? {
                        ContributorsFetch::Pending(status,) => Err(Error::service(format!(
                            "statistics are still being computed (status {status})"
                        ),),),
                        other => Ok(other,),
                    }
                },)
                .await
            }
        };

        match outcome {
            Ok(ContributorsFetch::Ready(contributors,),) => {
                let stats = select_contributor(repo, &contributors, login,);
                debug!("{}", stats);
                stats
            }
            Ok(ContributorsFetch::Pending(status,),) => {
                debug!("Stats for {} not ready yet (status {}), counting as empty", repo, status);
                RepoStats::empty(repo,)
            }
            Ok(ContributorsFetch::Unavailable(reason,),) => {
                warn!("Stats for {} unavailable: {}", repo, reason);
                RepoStats::empty(repo,)
            }
            Err(error,) => {
                warn!("Stats for {} unavailable: {}", repo, error);
                RepoStats::empty(repo,)
            }
        }
    }

    async fn fetch_contributors(&self, url: &str,) -> Result<ContributorsFetch, Error,>
    {
        let response = self
            .config
            .transport
            .get(url, RequestConfig::with_token(self.config.token.expose(),),)
            .await?;

        if matches!(response.status, 202 | 204) {
            return Ok(ContributorsFetch::Pending(response.status,),);
        }

        let document: Value = match serde_json::from_str(&response.body,) {
            Ok(document,) => document,
            Err(e,) => return Ok(ContributorsFetch::Unavailable(format!("unreadable body: {e}"),),),
        };

        if !document.is_array() {
            return Ok(ContributorsFetch::Unavailable(format!(
                "expected a contributor list, got status {}",
                response.status
            ),),);
        }

        Ok(match serde_json::from_value::<Vec<ContributorStats,>,>(document,) {
            Ok(contributors,) => ContributorsFetch::Ready(contributors,),
            Err(e,) => ContributorsFetch::Unavailable(format!("malformed contributor list: {e}"),),
        },)
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::json;

    use super::*;
    use crate::{
        stats::{StaticStatsSource, WeekStat},
        test_support::{FakeTransport, RecordedRequest, not_found},
        transport::HttpResponse,
    };

    const BASE: &str = "https://api.example";
    const GRAPHQL: &str = "https://api.example/graphql";

    fn graphql_page(resolver: &str, names: &[&str],) -> HttpResponse
    {
        let nodes: Vec<Value,> = names.iter().map(|n| json!({ "nameWithOwner": n }),).collect();
        HttpResponse::new(
            200,
            json!({ "data": { "viewer": { resolver: { "pageInfo": { "endCursor": "c" }, "nodes": nodes } } } })
                .to_string(),
        )
    }

    fn query_of(request: &RecordedRequest,) -> String
    {
        request.config.body.as_ref().and_then(|b| b["query"].as_str(),).unwrap_or_default().to_owned()
    }

    /// Scenario: viewer `alice`, owns `alice/x`, contributed to nothing.
    fn alice_transport() -> FakeTransport
    {
        FakeTransport::new(|request| match (request.method, request.url.as_str(),) {
            ("GET", "https://api.example/user",) => {
                Ok(HttpResponse::new(200, r#"{"login":"alice","avatar_url":"a","html_url":"h"}"#,),)
            }
            ("POST", GRAPHQL,) => {
                let query = query_of(request,);
                if query.contains("repositoriesContributedTo",) {
                    Ok(graphql_page("repositoriesContributedTo", &[],),)
                } else {
                    Ok(graphql_page("repositories", &["alice/x"],),)
                }
            }
            ("GET", "https://api.example/repos/alice/x/stats/contributors",) => Ok(HttpResponse::new(
                200,
                r#"[{"author":{"login":"alice"},"weeks":[{"a":50,"d":10,"c":3,"w":1000}]}]"#,
            ),),
            _ => not_found(),
        },)
    }

    fn engine_with(transport: FakeTransport,) -> StatsEngine
    {
        let config = EngineConfig::builder()
            .token("t0k",)
            .transport(Arc::new(transport,),)
            .base_url(BASE,)
            .graphql_url(GRAPHQL,)
            .build()
            .expect("valid config",);
        StatsEngine::new(config,)
    }

    #[test]
    fn builder_requires_token()
    {
        let fake = FakeTransport::new(|_| not_found(),);
        let missing = EngineConfig::builder().transport(Arc::new(fake.clone(),),).build();
        assert!(matches!(missing, Err(Error::MissingToken)));

        let blank = EngineConfig::builder().token("  ",).transport(Arc::new(fake.clone(),),).build();
        assert!(matches!(blank, Err(Error::MissingToken)));
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn builder_rejects_relative_urls()
    {
        let fake = FakeTransport::new(|_| not_found(),);
        let result = EngineConfig::builder()
            .token("t",)
            .transport(Arc::new(fake,),)
            .base_url("/api",)
            .build();
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn builder_defaults_to_public_github()
    {
        let fake = FakeTransport::new(|_| not_found(),);
        let config =
            EngineConfig::builder().token("t",).transport(Arc::new(fake,),).build().expect("config",);
        assert_eq!(config.base_url(), GITHUB_BASE_URL);
        assert_eq!(config.graphql_url(), GITHUB_GRAPHQL_URL);
        assert_eq!(config.token().expose(), "t");
    }

    #[test]
    fn builder_trims_trailing_slashes()
    {
        let fake = FakeTransport::new(|_| not_found(),);
        let config = EngineConfig::builder()
            .token("t",)
            .transport(Arc::new(fake,),)
            .base_url("https://ghe.example/api/v3/",)
            .build()
            .expect("config",);
        assert_eq!(config.base_url(), "https://ghe.example/api/v3");
    }

    #[tokio::test]
    async fn end_to_end_counts_viewer_lines()
    {
        let fake = alice_transport();
        let engine = engine_with(fake.clone(),);

        let stats = engine.generate_stats().await.expect("aggregation should succeed",);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "alice/x");
        assert_eq!(stats[0].count(), 40);
        assert_eq!(StatsEngine::calc_line_count(&stats,), 40);
        assert_eq!(fake.count_matching("GET", "/user",), 1);
        assert_eq!(fake.count_matching("POST", "/graphql",), 2);
    }

    #[tokio::test]
    async fn requests_carry_token_authorization()
    {
        let fake = alice_transport();
        let engine = engine_with(fake.clone(),);
        engine.generate_stats().await.expect("aggregation should succeed",);

        for request in fake.requests() {
            assert_eq!(request.config.headers["authorization"], "Token t0k", "{}", request.url);
        }
    }

    #[tokio::test]
    async fn bad_token_fails_before_listing()
    {
        let fake = FakeTransport::new(|_| Ok(HttpResponse::new(401, r#"{"message":"Bad credentials"}"#,),),);
        let engine = engine_with(fake.clone(),);

        let error = engine.generate_stats().await.expect_err("expected bad token",);

        assert!(matches!(error, Error::BadToken));
        assert_eq!(fake.count_matching("POST", "/graphql",), 0);
        assert_eq!(fake.count_matching("GET", "/stats/contributors",), 0);
    }

    #[tokio::test]
    async fn validates_token_once_across_operations()
    {
        let fake = alice_transport();
        let engine = engine_with(fake.clone(),);

        engine.generate_stats().await.expect("stats",);
        engine.generate_stats_of_my_repos().await.expect("stats",);
        engine.generate_stats_of("alice/x",).await.expect("stats",);

        assert_eq!(fake.count_matching("GET", "/user",), 1);
    }

    #[tokio::test]
    async fn pending_stats_count_as_empty()
    {
        let fake = FakeTransport::new(|request| match request.url.as_str() {
            "https://api.example/user" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            _ => Ok(HttpResponse::new(204, "",),),
        },);
        let engine = engine_with(fake,);

        let stats = engine.generate_stats_of("alice/x",).await.expect("no error on 204",);

        assert_eq!(stats, RepoStats::empty("alice/x"));
        assert_eq!(stats.count(), 0);
    }

    #[tokio::test]
    async fn missing_viewer_entry_yields_empty_stats()
    {
        let fake = FakeTransport::new(|request| match request.url.as_str() {
            "https://api.example/user" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            _ => Ok(HttpResponse::new(
                200,
                r#"[{"author":{"login":"bob"},"weeks":[{"a":5,"d":1,"c":1,"w":1}]}]"#,
            ),),
        },);
        let engine = engine_with(fake,);

        let stats = engine.generate_stats_of("bob/y",).await.expect("no error",);
        assert!(stats.weeks.is_empty());
    }

    #[tokio::test]
    async fn malformed_and_failed_fetches_are_absorbed()
    {
        let fake = FakeTransport::new(|request| match request.url.as_str() {
            "https://api.example/user" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            url if url.contains("/repos/a/object/",) => {
                Ok(HttpResponse::new(200, r#"{"message":"Not Found"}"#,),)
            }
            url if url.contains("/repos/a/html/",) => Ok(HttpResponse::new(502, "<html>",),),
            _ => Err(Error::transport("connection reset",),),
        },);
        let engine = engine_with(fake,);

        for repo in ["a/object", "a/html", "a/offline"] {
            let stats = engine.generate_stats_of(repo,).await.expect("absorbed",);
            assert_eq!(stats, RepoStats::empty(repo));
        }
    }

    #[tokio::test]
    async fn one_failing_repository_does_not_abort_the_run()
    {
        let fake = FakeTransport::new(|request| match (request.method, request.url.as_str(),) {
            ("GET", "https://api.example/user",) => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            ("POST", _,) => {
                if query_of(request,).contains("repositoriesContributedTo",) {
                    Ok(graphql_page("repositoriesContributedTo", &["bob/broken"],),)
                } else {
                    Ok(graphql_page("repositories", &["alice/x", "alice/y"],),)
                }
            }
            ("GET", url,) if url.contains("bob/broken",) => Err(Error::transport("timeout",),),
            ("GET", _,) => Ok(HttpResponse::new(
                200,
                r#"[{"author":{"login":"alice"},"weeks":[{"a":7,"d":2,"c":1,"w":1}]}]"#,
            ),),
            _ => not_found(),
        },);
        let engine = engine_with(fake,);

        let stats = engine.generate_stats().await.expect("run survives",);
        let mut names: Vec<&str,> = stats.iter().map(|s| s.name.as_str(),).collect();
        names.sort_unstable();

        assert_eq!(names, vec!["alice/x", "alice/y", "bob/broken"]);
        assert_eq!(StatsEngine::calc_line_count(&stats,), 10);
    }

    #[tokio::test]
    async fn listing_failure_aborts_the_run()
    {
        let fake = FakeTransport::new(|request| match request.method {
            "GET" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            _ => Ok(HttpResponse::new(200, r#"{"data":{"viewer":{}}}"#,),),
        },);
        let engine = engine_with(fake,);

        let error = engine.generate_stats_of_contributed_repos().await.expect_err("protocol",);
        assert!(matches!(error, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn custom_sources_replace_default_resolvers()
    {
        let fake = FakeTransport::new(|request| match request.url.as_str() {
            "https://api.example/user" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            _ => not_found(),
        },);
        let week = WeekStat {
            timestamp: 0, additions: 12, deletions: 2, commits: 1,
        };
        let sources: Vec<Arc<dyn StatsSource,>,> = vec![
            Arc::new(StaticStatsSource::new(vec![RepoStats::new("a/1", vec![week],)],),),
            Arc::new(StaticStatsSource::new(vec![RepoStats::new("a/2", vec![week, week],)],),),
        ];
        let config = EngineConfig::builder()
            .token("t",)
            .transport(Arc::new(fake.clone(),),)
            .base_url(BASE,)
            .build()
            .expect("config",);
        let engine = StatsEngine::with_sources(config, sources,);

        let stats = engine.generate_stats().await.expect("sources succeed",);

        assert_eq!(stats.len(), 2);
        assert_eq!(StatsEngine::calc_line_count(&stats,), 30);
        assert_eq!(fake.count_matching("POST", "",), 0);
    }

    #[tokio::test]
    async fn stats_retry_polls_until_ready()
    {
        let polls = Arc::new(AtomicUsize::new(0,),);
        let counter = polls.clone();
        let fake = FakeTransport::new(move |request| match request.url.as_str() {
            "https://api.example/user" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            _ => {
                if counter.fetch_add(1, Ordering::SeqCst,) < 2 {
                    Ok(HttpResponse::new(202, "{}",),)
                } else {
                    Ok(HttpResponse::new(
                        200,
                        r#"[{"author":{"login":"alice"},"weeks":[{"a":3,"d":1,"c":1,"w":1}]}]"#,
                    ),)
                }
            }
        },);
        let config = EngineConfig::builder()
            .token("t",)
            .transport(Arc::new(fake,),)
            .base_url(BASE,)
            .stats_retry(RetryConfig::polling(5, 1,),)
            .build()
            .expect("config",);
        let engine = StatsEngine::new(config,);

        let stats = engine.generate_stats_of("alice/x",).await.expect("stats",);

        assert_eq!(stats.count(), 2);
        assert_eq!(polls.load(Ordering::SeqCst,), 3);
    }

    #[tokio::test]
    async fn exhausted_stats_retry_yields_empty_stats()
    {
        let fake = FakeTransport::new(|request| match request.url.as_str() {
            "https://api.example/user" => Ok(HttpResponse::new(200, r#"{"login":"alice"}"#,),),
            _ => Ok(HttpResponse::new(204, "",),),
        },);
        let config = EngineConfig::builder()
            .token("t",)
            .transport(Arc::new(fake.clone(),),)
            .base_url(BASE,)
            .stats_retry(RetryConfig::polling(3, 1,),)
            .build()
            .expect("config",);
        let engine = StatsEngine::new(config,);

        let stats = engine.generate_stats_of("alice/x",).await.expect("stats",);

        assert!(stats.weeks.is_empty());
        assert_eq!(fake.count_matching("GET", "/stats/contributors",), 3);
    }
}
