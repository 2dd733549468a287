//! Command-line interface for the `hml` binary.
//!
//! Without a subcommand the binary prints the bare line count of the token
//! owner, which is what the GitHub Action captures. The remaining subcommands
//! store that count in the pool repository and publish the README built from
//! every stored count.

use std::{io, path::PathBuf, process, sync::Arc, time::Duration};

use clap::{ArgAction, Args, Parser, Subcommand};
use hml::{
    DEFAULT_REQUEST_TIMEOUT_SECS, EngineConfig, Error, GITHUB_BASE_URL, GITHUB_BASE_URL_ENV,
    GITHUB_GRAPHQL_URL, GITHUB_GRAPHQL_URL_ENV, GITHUB_REPO_TOKEN_ENV, HttpTransport,
    MarkdownStats, OctocrabTransport, PoolStore, REPOSITORY_ENV, REQUEST_TIMEOUT_ENV, RepoStats,
    ReadmePublisher, RepositorySlug, StatsEngine, Token, USER_TOKEN_ENV, WeekStat,
    calc_line_count, render_collection, token_from_assignment, update_local_readme,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Count the lines of code a GitHub user wrote.
#[derive(Debug, Parser,)]
#[command(name = "hml", version, about = "Count the lines of code a GitHub user wrote")]
struct Cli
{
    #[command(subcommand)]
    command: Option<Command,>,

    #[command(flatten)]
    github: GithubArgs,

    /// Arguments of the implicit `count` command.
    #[command(flatten)]
    count: CountArgs,
}

#[derive(Debug, Subcommand,)]
enum Command
{
    /// Print the total line count of the token owner.
    Count(CountArgs,),
    /// Print the per-repository stats as JSON.
    Stats(StatsArgs,),
    /// Store the token owner's line count in the pool repository.
    Pool(PoolArgs,),
    /// Render every pool record into the README.
    Readme(ReadmeArgs,),
}

/// Endpoints and limits shared by every command.
#[derive(Debug, Args,)]
struct GithubArgs
{
    #[arg(long = "base-url", global = true, env = GITHUB_BASE_URL_ENV, default_value = GITHUB_BASE_URL)]
    base_url: String,

    #[arg(
        long = "graphql-url",
        global = true,
        env = GITHUB_GRAPHQL_URL_ENV,
        default_value = GITHUB_GRAPHQL_URL
    )]
    graphql_url: String,

    /// Per-request timeout in seconds.
    #[arg(
        long = "timeout",
        value_name = "SECS",
        global = true,
        env = REQUEST_TIMEOUT_ENV,
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    timeout_secs: u64,
}

impl GithubArgs
{
    fn timeout(&self,) -> Duration
    {
        Duration::from_secs(self.timeout_secs,)
    }
}

#[derive(Debug, Args, Default,)]
struct UserTokenArgs
{
    /// Token of the user whose lines are counted.
    #[arg(long = "token", env = USER_TOKEN_ENV, hide_env_values = true)]
    token: Option<String,>,
}

#[derive(Debug, Args, Default,)]
struct CountArgs
{
    /// Token given as `TOKEN=<value>`; wins over `--token`.
    #[arg(value_name = "TOKEN=<value>")]
    assignment: Option<String,>,

    #[command(flatten)]
    user: UserTokenArgs,
}

#[derive(Debug, Args,)]
struct StatsArgs
{
    #[command(flatten)]
    user: UserTokenArgs,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Location of the pool repository and the token allowed to write to it.
#[derive(Debug, Args,)]
struct PoolRepositoryArgs
{
    /// Storage repository in `owner/repo` form.
    #[arg(long = "repository", value_name = "OWNER/REPO", env = REPOSITORY_ENV)]
    repository: RepositorySlug,

    #[arg(long = "repo-token", env = GITHUB_REPO_TOKEN_ENV, hide_env_values = true)]
    repo_token: String,
}

#[derive(Debug, Args,)]
struct PoolArgs
{
    #[command(flatten)]
    user: UserTokenArgs,

    #[command(flatten)]
    pool: PoolRepositoryArgs,
}

#[derive(Debug, Args,)]
struct ReadmeArgs
{
    #[command(flatten)]
    pool: PoolRepositoryArgs,

    /// Update a README on disk instead of committing to the pool repository.
    #[arg(long = "local", value_name = "PATH")]
    local: Option<PathBuf,>,
}

/// Per-repository entry printed by `stats`.
#[derive(Debug, Serialize,)]
struct StatsReport<'a,>
{
    name:  &'a str,
    count: i64,
    weeks: &'a [WeekStat],
}

#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Logs go to stderr so stdout only carries command output.
fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

async fn run(cli: Cli,) -> Result<(), Error,>
{
    match cli.command {
        Some(Command::Count(args,),) => run_count(&cli.github, args,).await,
        Some(Command::Stats(args,),) => run_stats(&cli.github, args,).await,
        Some(Command::Pool(args,),) => run_pool(&cli.github, args,).await,
        Some(Command::Readme(args,),) => run_readme(&cli.github, args,).await,
        None => run_count(&cli.github, cli.count,).await,
    }
}

/// Picks the token from `TOKEN=<value>` first and `--token`/`USER_TOKEN`
/// second.
fn resolve_user_token(args: &CountArgs,) -> Result<Option<String,>, Error,>
{
    match args.assignment.as_deref() {
        Some(raw,) => token_from_assignment(raw,)
            .map(|token| Some(token.to_owned(),),)
            .ok_or_else(|| Error::validation(format!("expected TOKEN=<value>, got '{raw}'"),),),
        None => Ok(args.user.token.clone(),),
    }
}

fn build_engine(github: &GithubArgs, token: Option<String,>,) -> Result<StatsEngine, Error,>
{
    let config = EngineConfig::builder()
        .token(token.unwrap_or_default(),)
        .base_url(&github.base_url,)
        .graphql_url(&github.graphql_url,)
        .timeout(github.timeout(),)
        .build()?;

    Ok(StatsEngine::new(config,),)
}

async fn run_count(github: &GithubArgs, args: CountArgs,) -> Result<(), Error,>
{
    let engine = build_engine(github, resolve_user_token(&args,)?,)?;
    let stats = engine.generate_stats().await?;

    println!("{}", calc_line_count(&stats,));
    Ok((),)
}

async fn run_stats(github: &GithubArgs, args: StatsArgs,) -> Result<(), Error,>
{
    let engine = build_engine(github, args.user.token,)?;
    let stats = engine.generate_stats().await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_stats(&mut handle, &stats, args.pretty,)
}

fn write_stats<W: io::Write,>(writer: &mut W, stats: &[RepoStats], pretty: bool,) -> Result<(), Error,>
{
    let reports: Vec<StatsReport<'_,>,> = stats
        .iter()
        .map(|repo| StatsReport {
            name: &repo.name, count: repo.count(), weeks: &repo.weeks,
        },)
        .collect();

    if pretty {
        serde_json::to_writer_pretty(writer, &reports,)?;
    } else {
        serde_json::to_writer(writer, &reports,)?;
    }

    Ok((),)
}

async fn run_pool(github: &GithubArgs, args: PoolArgs,) -> Result<(), Error,>
{
    let engine = build_engine(github, args.user.token,)?;
    let stats = engine.generate_stats().await?;
    let viewer = engine.viewer().await?;

    let store = PoolStore::new(
        engine.config().transport(),
        engine.config().base_url(),
        args.pool.repository,
        Token::new(&args.pool.repo_token,)?,
    );
    let outcome = store.upsert_record(viewer, calc_line_count(&stats,),).await?;

    println!("{outcome}");
    Ok((),)
}

async fn run_readme(github: &GithubArgs, args: ReadmeArgs,) -> Result<(), Error,>
{
    let transport: Arc<dyn HttpTransport,> = Arc::new(OctocrabTransport::new(Some(github.timeout(),),)?,);
    let token = Token::new(&args.pool.repo_token,)?;

    let store =
        PoolStore::new(transport.clone(), &github.base_url, args.pool.repository.clone(), token.clone(),);
    let records = store.fetch_pool_records().await?;

    let items: Vec<MarkdownStats,> = records.iter().map(MarkdownStats::from,).collect();
    let markdown = render_collection(&items,);

    match args.local {
        Some(path,) => {
            let changed = update_local_readme(&path, &markdown,)?;
            println!("{}", if changed { "updated" } else { "unchanged" });
        }
        None => {
            let mentions: Vec<u64,> = records.iter().map(|stored| stored.issue,).collect();
            let publisher =
                ReadmePublisher::new(transport, &github.base_url, args.pool.repository, token,);
            let commit = publisher.publish(&markdown, &mentions,).await?;
            println!("{}", commit.message);
        }
    }

    Ok((),)
}
