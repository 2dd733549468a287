// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GraphQL query execution capability.
///
/// The engine never posts GraphQL documents itself; it hands them to a
/// [`QueryExecutor`], which tests replace with canned pages.
use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    error::Error,
    transport::{HttpTransport, RequestConfig},
};

/// Executes a GraphQL document and returns its `data` object.
#[async_trait]
pub trait QueryExecutor: Send + Sync
{
    async fn execute(
        &self,
        url: &str,
        query: &str,
        variables: Value,
        headers: BTreeMap<String, String,>,
    ) -> Result<Value, Error,>;
}

/// Default executor posting `{query, variables}` through an [`HttpTransport`].
#[derive(Clone,)]
pub struct TransportQueryExecutor
{
    transport: Arc<dyn HttpTransport,>,
}

impl TransportQueryExecutor
{
    pub fn new(transport: Arc<dyn HttpTransport,>,) -> Self
    {
        Self {
            transport,
        }
    }
}

#[async_trait]
impl QueryExecutor for TransportQueryExecutor
{
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for non-2xx answers, GraphQL `errors` or a
    /// missing `data` member, and propagates transport failures.
    async fn execute(
        &self,
        url: &str,
        query: &str,
        variables: Value,
        headers: BTreeMap<String, String,>,
    ) -> Result<Value, Error,>
    {
        let config = RequestConfig {
            headers,
            body: Some(json!({ "query": query, "variables": variables }),),
        };
        let response = self.transport.post(url, config,).await?;

        if !response.is_success() {
            return Err(Error::protocol(format!(
                "GraphQL endpoint answered with status {}",
                response.status
            ),),);
        }

        let mut document = response.json()?;

        if let Some(errors,) = document.get("errors",).filter(|value| !value.is_null(),) {
            return Err(Error::protocol(format!("GraphQL errors: {errors}"),),);
        }

        match document.get_mut("data",).map(Value::take,) {
            Some(data,) if !data.is_null() => Ok(data,),
            _ => Err(Error::protocol("GraphQL response has no data member",),),
        }
    }
}
