#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the line counting crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::path::{Path, PathBuf};

/// Unified error type returned by the stats engine, the pool store and the
/// CLI.
///
/// Only whole-run failures are represented here. Faults scoped to a single
/// repository are absorbed by the engine and never reach callers.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// No token was supplied. Raised before any network call is issued.
    #[error(
        "MISSING_TOKEN: a GitHub token is required to make this request, set USER_TOKEN or pass TOKEN=<token>"
    )]
    MissingToken,
    /// The authenticated-user endpoint rejected the token.
    #[error("BAD_TOKEN: the supplied GitHub token was rejected, provide a valid token")]
    BadToken,
    /// Network level failure while talking to GitHub.
    #[error("transport error: {message}")]
    Transport {
        /// Human readable description of the failed request.
        message: String
    },
    /// GitHub answered with a document that does not have the expected
    /// shape.
    #[error("unexpected response: {message}")]
    Protocol {
        /// Description of the structural mismatch.
        message: String
    },
    /// Wraps JSON decoding and encoding errors.
    #[error("failed to process JSON: {source}")]
    Decode {
        /// Underlying serde_json error.
        source: serde_json::Error
    },
    /// Returned when user input or repository content violates invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps I/O errors that occur while reading or writing local files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file being processed.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a transport error from the provided displayable value.
    pub fn transport<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Transport {
            message: message.into()
        }
    }

    /// Constructs a protocol error from the provided displayable value.
    pub fn protocol<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Protocol {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Decode {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
