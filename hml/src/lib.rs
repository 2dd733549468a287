//! Line-count statistics for GitHub users.
//!
//! The library lists every repository a token owner owns or contributed to,
//! reads GitHub's weekly contributor statistics for each of them and reduces
//! the owner's series to a single net line count (additions minus
//! deletions). Counts are stored as "pool" issues in a storage repository and
//! rendered into a README section.
//!
//! Only whole-run failures (missing or rejected token, a broken repository
//! listing) surface as [`Error`]. A repository whose statistics cannot be read
//! contributes zero lines.
//!
//! # Example
//!
//! ```no_run
//! use hml::{EngineConfig, StatsEngine};
//!
//! # async fn example() -> Result<(), hml::Error> {
//! let config = EngineConfig::builder().token("ghp_token",).build()?;
//! let engine = StatsEngine::new(config,);
//! let stats = engine.generate_stats().await?;
//! println!("{}", StatsEngine::calc_line_count(&stats,));
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
mod executor;
mod markdown;
mod pagination;
mod pool;
mod query;
mod readme;
mod retry;
mod stats;
mod transport;
mod viewer;

#[cfg(test)]
mod test_support;

pub use config::{
    DEFAULT_REQUEST_TIMEOUT_SECS, GITHUB_BASE_URL_ENV, GITHUB_GRAPHQL_URL_ENV,
    GITHUB_REPO_TOKEN_ENV, REPOSITORY_ENV, REQUEST_TIMEOUT_ENV, RepositorySlug, USER_TOKEN_ENV,
    token_from_assignment,
};
pub use engine::{
    EngineConfig, EngineConfigBuilder, GITHUB_BASE_URL, GITHUB_GRAPHQL_URL, StatsEngine,
};
pub use error::{Error, io_error};
pub use executor::{QueryExecutor, TransportQueryExecutor};
pub use markdown::{MarkdownStats, StatsLevel, format_counter, render_collection, render_item};
pub use pagination::{PageTermination, list_repositories};
pub use pool::{
    LabelOutcome, POOL_ISSUE_LABEL, POOL_PAGE_SIZE, PoolIssue, PoolRecord, PoolStats, PoolStore,
    PoolUser, PoolWrite, StoredRecord, user_label,
};
pub use query::{PAGE_SIZE, Resolver, build_repositories_query};
pub use readme::{
    END_MARKER, ReadmeCommit, ReadmePublisher, START_MARKER, commit_message, readme_bounds,
    splice_readme, update_local_readme,
};
pub use retry::{RetryConfig, retry_with_backoff};
pub use stats::{RepoStats, StaticStatsSource, StatsSource, WeekStat, calc_line_count};
pub use transport::{
    AUTHORIZATION_HEADER, HttpResponse, HttpTransport, OctocrabTransport, RequestConfig,
    token_headers,
};
pub use viewer::{Token, TokenValidator, Viewer};
