//! Configuration values shared by the library and the CLI.
//!
//! Every CLI setting can be supplied through the environment variables named
//! here, which is how the GitHub Action workflow drives the binary. The
//! storage repository is addressed through a validated [`RepositorySlug`].

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Token of the user whose lines are counted.
pub const USER_TOKEN_ENV: &str = "USER_TOKEN";
/// Token with write access to the storage repository.
pub const GITHUB_REPO_TOKEN_ENV: &str = "GITHUB_REPO_TOKEN";
/// Storage repository in `owner/repo` form.
pub const REPOSITORY_ENV: &str = "REPOSITORY";
pub const GITHUB_BASE_URL_ENV: &str = "GITHUB_BASE_URL";
pub const GITHUB_GRAPHQL_URL_ENV: &str = "GITHUB_GRAPHQL_URL";
/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "HML_REQUEST_TIMEOUT_SECS";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Prefix of the `TOKEN=<value>` positional argument.
const TOKEN_ASSIGNMENT_PREFIX: &str = "TOKEN=";

/// Extracts the value of a `TOKEN=<value>` argument.
///
/// Returns `None` for arguments in any other form.
///
/// # Examples
///
/// ```
/// use hml::token_from_assignment;
///
/// assert_eq!(token_from_assignment("TOKEN=ghp_abc"), Some("ghp_abc"));
/// assert_eq!(token_from_assignment("ghp_abc"), None);
/// ```
pub fn token_from_assignment(argument: &str,) -> Option<&str,>
{
    argument.strip_prefix(TOKEN_ASSIGNMENT_PREFIX,)
}

/// Repository address split into owner and name.
///
/// # Examples
///
/// ```
/// use hml::RepositorySlug;
///
/// let slug: RepositorySlug = "octocat/pool".parse()?;
/// assert_eq!(slug.owner(), "octocat");
/// assert_eq!(slug.repo(), "pool");
/// assert_eq!(slug.to_string(), "octocat/pool");
/// # Ok::<(), hml::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash,)]
pub struct RepositorySlug
{
    owner: String,
    repo:  String,
}

impl RepositorySlug
{
    pub fn owner(&self,) -> &str
    {
        &self.owner
    }

    pub fn repo(&self,) -> &str
    {
        &self.repo
    }
}

impl FromStr for RepositorySlug
{
    type Err = Error;

    fn from_str(raw: &str,) -> Result<Self, Self::Err,>
    {
        let trimmed = raw.trim();
        let mut parts = trimmed.split('/',);

        match (parts.next(), parts.next(), parts.next(),) {
            (Some(owner,), Some(repo,), None,) if valid_segment(owner,) && valid_segment(repo,) => {
                Ok(Self {
                    owner: owner.to_owned(), repo: repo.to_owned(),
                },)
            }
            _ => Err(Error::validation(format!(
                "repository must be in owner/repo form, got '{trimmed}'"
            ),),),
        }
    }
}

fn valid_segment(segment: &str,) -> bool
{
    !segment.is_empty() && !segment.chars().any(char::is_whitespace,)
}

impl fmt::Display for RepositorySlug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn parses_owner_and_repo()
    {
        let slug: RepositorySlug = " lakscastro/howmanylines ".parse().expect("valid slug",);
        assert_eq!(slug.owner(), "lakscastro");
        assert_eq!(slug.repo(), "howmanylines");
    }

    #[test]
    fn rejects_malformed_slugs()
    {
        for raw in ["", "owner", "owner/", "/repo", "a/b/c", "own er/repo"] {
            let error = raw.parse::<RepositorySlug>().expect_err("expected validation error",);
            match error {
                Error::Validation {
                    message,
                } => assert!(message.contains("owner/repo"), "{message}"),
                other => panic!("unexpected error variant: {other:?}"),
            }
        }
    }

    #[test]
    fn token_assignment_requires_exact_prefix()
    {
        assert_eq!(token_from_assignment("TOKEN="), Some(""));
        assert_eq!(token_from_assignment("token=abc"), None);
        assert_eq!(token_from_assignment("MYTOKEN=abc"), None);
    }
}
