// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GraphQL query construction for the viewer's repository connections.
use std::fmt;

/// Number of nodes requested per page.
pub const PAGE_SIZE: usize = 100;

/// Repository connection fields exposed on the GraphQL `viewer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash,)]
pub enum Resolver
{
    /// Repositories owned by the viewer.
    Repositories,
    /// Repositories the viewer contributed to.
    RepositoriesContributedTo,
}

impl Resolver
{
    /// GraphQL field name of the connection.
    pub const fn as_str(self,) -> &'static str
    {
        match self {
            Self::Repositories => "repositories",
            Self::RepositoriesContributedTo => "repositoriesContributedTo",
        }
    }
}

impl fmt::Display for Resolver
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.as_str(),)
    }
}

/// Builds the query fetching one page of `resolver`.
///
/// The cursor is omitted on the first page and embedded verbatim, quoted,
/// afterwards. The function is pure.
///
/// # Example
///
/// ```
/// use hml::{Resolver, build_repositories_query};
///
/// let query = build_repositories_query(Resolver::Repositories, Some("Y3Vyc29y",),);
/// assert!(query.contains("repositories(first: 100, after: \"Y3Vyc29y\")"));
/// ```
pub fn build_repositories_query(resolver: Resolver, cursor: Option<&str,>,) -> String
{
    let after = cursor.map(|value| format!(", after: \"{value}\""),).unwrap_or_default();

    format!(
        "query GetRepositories {{
  viewer {{
    {resolver}(first: {PAGE_SIZE}{after}) {{
      pageInfo {{
        endCursor
        hasNextPage
      }}
      nodes {{
        nameWithOwner
      }}
    }}
  }}
}}"
    )
}
