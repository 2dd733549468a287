// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory [`HttpTransport`] used by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    error::Error,
    transport::{HttpResponse, HttpTransport, RequestConfig},
};

/// A request observed by [`FakeTransport`].
#[derive(Debug, Clone,)]
pub struct RecordedRequest
{
    pub method: &'static str,
    pub url:    String,
    pub config: RequestConfig,
}

type Handler = dyn Fn(&RecordedRequest,) -> Result<HttpResponse, Error,> + Send + Sync;

/// Transport answering every request through a closure and recording it.
#[derive(Clone,)]
pub struct FakeTransport
{
    handler:  Arc<Handler,>,
    requests: Arc<Mutex<Vec<RecordedRequest,>,>,>,
}

impl FakeTransport
{
    pub fn new<F,>(handler: F,) -> Self
    where
        F: Fn(&RecordedRequest,) -> Result<HttpResponse, Error,> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler,), requests: Arc::new(Mutex::new(Vec::new(),),),
        }
    }

    pub fn requests(&self,) -> Vec<RecordedRequest,>
    {
        self.requests.lock().expect("poisoned",).clone()
    }

    pub fn count_matching(&self, method: &str, url_fragment: &str,) -> usize
    {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.contains(url_fragment,),)
            .count()
    }

    fn record(
        &self,
        method: &'static str,
        url: &str,
        config: RequestConfig,
    ) -> Result<HttpResponse, Error,>
    {
        let request = RecordedRequest {
            method,
            url: url.to_owned(),
            config,
        };
        self.requests.lock().expect("poisoned",).push(request.clone(),);
        (self.handler)(&request,)
    }
}

#[async_trait]
impl HttpTransport for FakeTransport
{
    async fn get(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.record("GET", url, config,)
    }

    async fn post(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.record("POST", url, config,)
    }

    async fn put(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.record("PUT", url, config,)
    }

    async fn patch(&self, url: &str, config: RequestConfig,) -> Result<HttpResponse, Error,>
    {
        self.record("PATCH", url, config,)
    }
}

pub fn not_found() -> Result<HttpResponse, Error,>
{
    Ok(HttpResponse::new(404, r#"{"message":"Not Found"}"#,),)
}
