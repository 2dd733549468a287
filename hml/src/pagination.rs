// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Cursor-driven listing of the viewer's repositories.
///
/// Pages are fetched strictly in sequence because every request depends on
/// the cursor returned by the previous one.
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    error::Error,
    executor::QueryExecutor,
    query::{PAGE_SIZE, Resolver, build_repositories_query},
    transport::token_headers,
};

/// Rule deciding whether another page must be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default,)]
pub enum PageTermination
{
    /// A full page (exactly [`PAGE_SIZE`] nodes) implies more pages. A final
    /// page holding exactly [`PAGE_SIZE`] nodes therefore costs one extra,
    /// empty request.
    #[default]
    PageLength,
    /// Trust the connection's `pageInfo.hasNextPage`, falling back to
    /// [`PageTermination::PageLength`] when the field is absent.
    HasNextPage,
}

impl PageTermination
{
    fn has_more(self, page_len: usize, has_next_page: Option<bool,>,) -> bool
    {
        match (self, has_next_page,) {
            (Self::HasNextPage, Some(flag,),) => flag,
            _ => page_len == PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize,)]
struct Connection
{
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    nodes:     Vec<RepositoryNode,>,
}

#[derive(Debug, Deserialize,)]
struct PageInfo
{
    #[serde(rename = "endCursor", default)]
    end_cursor:    Option<String,>,
    #[serde(rename = "hasNextPage", default)]
    has_next_page: Option<bool,>,
}

#[derive(Debug, Deserialize,)]
struct RepositoryNode
{
    #[serde(rename = "nameWithOwner")]
    name_with_owner: String,
}

fn parse_connection(data: &Value, resolver: Resolver,) -> Result<Connection, Error,>
{
    let connection = data
        .get("viewer",)
        .and_then(|viewer| viewer.get(resolver.as_str(),),)
        .ok_or_else(|| Error::protocol(format!("response is missing viewer.{resolver}"),),)?;

    serde_json::from_value(connection.clone(),)
        .map_err(|e| Error::protocol(format!("malformed {resolver} page: {e}"),),)
}

/// Collects every `owner/name` identifier exposed by `resolver`.
///
/// Identifiers keep the order GitHub returned them in and are not
/// deduplicated.
///
/// # Errors
///
/// Propagates executor failures and returns [`Error::Protocol`] when a page
/// does not have the expected shape. Either aborts the whole listing.
pub async fn list_repositories(
    executor: &dyn QueryExecutor,
    graphql_url: &str,
    token: &str,
    resolver: Resolver,
    termination: PageTermination,
) -> Result<Vec<String,>, Error,>
{
    let mut repositories = Vec::new();
    let mut cursor: Option<String,> = None;
    let mut page_number = 1u32;

    loop {
        let query = build_repositories_query(resolver, cursor.as_deref(),);
        let data = executor.execute(graphql_url, &query, json!({}), token_headers(token,),).await?;
        let connection = parse_connection(&data, resolver,)?;

        let page_len = connection.nodes.len();
        debug!("{} page {} returned {} repositories", resolver, page_number, page_len);

        repositories.extend(connection.nodes.into_iter().map(|node| node.name_with_owner,),);

        if !termination.has_more(page_len, connection.page_info.has_next_page,) {
            break;
        }

        match connection.page_info.end_cursor {
            Some(next,) => cursor = Some(next,),
            None => {
                warn!("{} page {} is full but carries no end cursor", resolver, page_number);
                break;
            }
        }
        page_number += 1;
    }

    Ok(repositories,)
}
