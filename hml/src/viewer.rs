// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Token validation against the authenticated-user endpoint.
///
/// The endpoint is consulted at most once per validator. Both outcomes (a
/// viewer or a rejection) are cached; transport failures are not, so a later
/// call may retry them.
use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    transport::{HttpTransport, RequestConfig},
};

/// A GitHub token that is known to be non-empty.
#[derive(Clone, PartialEq, Eq,)]
pub struct Token(String,);

impl Token
{
    /// Wraps `raw` after trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] when nothing is left after trimming.
    pub fn new(raw: impl AsRef<str,>,) -> Result<Self, Error,>
    {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::MissingToken,);
        }
        Ok(Self(trimmed.to_owned(),),)
    }

    pub fn expose(&self,) -> &str
    {
        &self.0
    }
}

impl fmt::Debug for Token
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str("Token(***)",)
    }
}

/// The account owning the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Viewer
{
    pub login:      String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url:   String,
}

/// Memoized token check.
pub struct TokenValidator
{
    transport: Arc<dyn HttpTransport,>,
    user_url:  String,
    token:     Token,
    viewer:    OnceCell<Option<Viewer,>,>,
}

impl TokenValidator
{
    /// Creates a validator querying `{base_url}/user`.
    pub fn new(transport: Arc<dyn HttpTransport,>, base_url: &str, token: Token,) -> Self
    {
        Self {
            transport,
            user_url: format!("{}/user", base_url.trim_end_matches('/',)),
            token,
            viewer: OnceCell::new(),
        }
    }

    /// Returns the viewer, querying GitHub on first use only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadToken`] when GitHub did not answer 200, and
    /// propagates transport failures of the first query.
    pub async fn ensure_valid(&self,) -> Result<&Viewer, Error,>
    {
        let cached = self.viewer.get_or_try_init(|| self.fetch_viewer(),).await?;
        cached.as_ref().ok_or(Error::BadToken,)
    }

    async fn fetch_viewer(&self,) -> Result<Option<Viewer,>, Error,>
    {
        debug!("Validating token against {}", self.user_url);

        let response = self
            .transport
            .get(&self.user_url, RequestConfig::with_token(self.token.expose(),),)
            .await?;

        if response.status != 200 {
            warn!("Token rejected by {} with status {}", self.user_url, response.status);
            return Ok(None,);
        }

        let viewer: Viewer = serde_json::from_str(&response.body,)
            .map_err(|e| Error::protocol(format!("malformed user document: {e}"),),)?;
        info!("Token belongs to {}", viewer.login);

        Ok(Some(viewer,),)
    }
}
