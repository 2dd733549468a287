// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// HTTP transport abstraction used to reach the GitHub REST and GraphQL APIs.
///
/// Every component that talks to GitHub goes through [`HttpTransport`] so the
/// concrete client can be swapped per environment. Non-success statuses are
/// returned as regular responses; only failures to complete the exchange are
/// reported as [`Error::Transport`].
use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use http::Method;
use octocrab::Octocrab;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;

/// Header carrying the GitHub credentials.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Builds the `Token <token>` authorization header map.
pub fn token_headers(token: &str,) -> BTreeMap<String, String,>
{
    let mut headers = BTreeMap::new();
    headers.insert(AUTHORIZATION_HEADER.to_owned(), format!("Token {token}"),);
    headers
}

/// Request options shared by all HTTP verbs.
#[derive(Debug, Clone, Default, PartialEq,)]
pub struct RequestConfig
{
    /// Headers attached to the request.
    pub headers: BTreeMap<String, String,>,
    /// Optional JSON body.
    pub body:    Option<Value,>,
}

impl RequestConfig
{
    /// Creates a body-less request authorized with `token`.
    pub fn with_token(token: &str,) -> Self
    {
        Self {
            headers: token_headers(token,), body: None,
        }
    }

    /// Attaches a JSON body to the request.
    #[must_use]
    pub fn body(mut self, body: Value,) -> Self
    {
        self.body = Some(body,);
        self
    }
}

/// Status and raw body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct HttpResponse
{
    pub status: u16,
    pub body:   String,
}

impl HttpResponse
{
    pub fn new(status: u16, body: impl Into<String,>,) -> Self
    {
        Self {
            status, body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self,) -> bool
    {
        (200..300).contains(&self.status,)
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the body is not valid JSON.
    pub fn json(&self,) -> Result<Value, Error,>
    {
        Ok(serde_json::from_str(&self.body,)?,)
    }
}

/// Minimal HTTP client capability required by the crate.
#[async_trait]
pub trait HttpTransport: Send + Sync
{
    async fn get(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>;

    async fn post(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>;

    async fn put(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>;

    /// Required by GitHub's issue update endpoint.
    async fn patch(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>;
}

/// [`HttpTransport`] backed by octocrab's raw request API.
///
/// The client carries no credentials of its own; authorization travels in the
/// per-request headers so one transport can serve several tokens.
#[derive(Debug, Clone,)]
pub struct OctocrabTransport
{
    client: Octocrab,
}

impl OctocrabTransport
{
    /// Builds a transport whose connect and read phases are bounded by
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the underlying client cannot be
    /// constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    ///
    /// use hml::OctocrabTransport;
    ///
    /// # fn example() -> Result<(), hml::Error> {
    /// let transport = OctocrabTransport::new(Some(Duration::from_secs(30,),),)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(timeout: Option<Duration,>,) -> Result<Self, Error,>
    {
        let client = Octocrab::builder()
            .set_connect_timeout(timeout,)
            .set_read_timeout(timeout,)
            .build()
            .map_err(|e| Error::transport(format!("failed to build GitHub client: {e}"),),)?;

        Ok(Self {
            client,
        },)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<HttpResponse, Error,>
    {
        debug!("{} {}", method, url);

        let mut builder = http::Request::builder().method(method.clone(),).uri(url,);
        for (name, value,) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str(),);
        }

        let request = self
            .client
            .build_request(builder, config.body.as_ref(),)
            .map_err(|e| Error::transport(format!("failed to build {method} {url}: {e}"),),)?;

        let response = self
            .client
            .execute(request,)
            .await
            .map_err(|e| Error::transport(format!("{method} {url} failed: {e}"),),)?;

        let status = response.status().as_u16();
        let body = self
            .client
            .body_to_string(response,)
            .await
            .map_err(|e| Error::transport(format!("failed to read body of {url}: {e}"),),)?;

        Ok(HttpResponse {
            status,
            body,
        },)
    }
}

#[async_trait]
impl HttpTransport for OctocrabTransport
{
    async fn get(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.send(Method::GET, url, config,).await
    }

    async fn post(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.send(Method::POST, url, config,).await
    }

    async fn put(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.send(Method::PUT, url, config,).await
    }

    async fn patch(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.send(Method::PATCH, url, config,).await
    }
}
