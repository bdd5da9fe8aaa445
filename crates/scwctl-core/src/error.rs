//! Unified error handling for scwctl-core
//!
//! Every API call, waiter and sweeper returns [`ScwError`]. HTTP status codes
//! are mapped to dedicated variants so callers can branch on them through the
//! helper predicates instead of matching on numbers.
//!
//! # Example
//!
//! ```rust
//! use scwctl_core::{ErrorList, ScwError};
//!
//! let mut errs = ErrorList::new();
//! errs.push(ScwError::NotFound {
//!     message: "volume not found".to_string(),
//!     kind: None,
//! });
//!
//! let err = errs.into_result().unwrap_err();
//! assert!(err.is_not_found());
//! ```

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for every scwctl-core operation
#[derive(Error, Debug)]
pub enum ScwError {
    /// Connection, TLS or timeout failure below the HTTP layer
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// 400
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        kind: Option<String>,
    },

    /// 401
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        kind: Option<String>,
    },

    /// 403
    #[error("Permission denied: {message}")]
    PermissionDenied {
        message: String,
        kind: Option<String>,
    },

    /// 404
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        kind: Option<String>,
    },

    /// 409 / 412
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        kind: Option<String>,
    },

    /// 429
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        kind: Option<String>,
    },

    /// 5xx
    #[error("Server error ({status}): {message}")]
    ServerError {
        status: u16,
        message: String,
        kind: Option<String>,
    },

    /// Any other non-2xx status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        kind: Option<String>,
    },

    /// A waiter spent its whole polling budget without reaching a terminal state
    #[error("max retries exceeded waiting for {resource} {id} after {attempts} attempts")]
    MaxRetriesExceeded {
        resource: String,
        id: String,
        attempts: u32,
    },

    /// A waiter saw a state it does not know how to classify
    #[error("unknown state for {resource} {id}: {state}")]
    UnknownState {
        resource: String,
        id: String,
        state: String,
    },

    #[error("Invalid locality: {0}")]
    InvalidLocality(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An error annotated with the operation that produced it
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ScwError>,
    },

    /// Several independent failures, e.g. from a sweep
    #[error("{0}")]
    Multiple(ErrorList),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, ScwError>;

impl ScwError {
    /// Build the status-specific variant for a failed HTTP response
    pub fn from_status(status: u16, message: String, kind: Option<String>) -> Self {
        match status {
            400 => ScwError::BadRequest { message, kind },
            401 => ScwError::AuthenticationFailed { message, kind },
            403 => ScwError::PermissionDenied { message, kind },
            404 => ScwError::NotFound { message, kind },
            409 | 412 => ScwError::Conflict { message, kind },
            429 => ScwError::RateLimited { message, kind },
            500..=599 => ScwError::ServerError {
                status,
                message,
                kind,
            },
            _ => ScwError::Api {
                status,
                message,
                kind,
            },
        }
    }

    /// Wrap this error with a description of what was being done
    pub fn context(self, context: impl Into<String>) -> Self {
        ScwError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strip any `Context` layers and return the underlying error
    pub fn root(&self) -> &ScwError {
        match self {
            ScwError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status of the failed call, if this error came from a response
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            ScwError::BadRequest { .. } => Some(400),
            ScwError::AuthenticationFailed { .. } => Some(401),
            ScwError::PermissionDenied { .. } => Some(403),
            ScwError::NotFound { .. } => Some(404),
            ScwError::Conflict { .. } => Some(409),
            ScwError::RateLimited { .. } => Some(429),
            ScwError::ServerError { status, .. } | ScwError::Api { status, .. } => Some(*status),
            ScwError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    fn check(&self, pred: fn(&ScwError) -> bool) -> bool {
        match self.root() {
            ScwError::Multiple(list) => !list.is_empty() && list.iter().all(|e| e.check(pred)),
            other => pred(other),
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.check(|e| matches!(e, ScwError::NotFound { .. }))
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.check(|e| {
            matches!(
                e,
                ScwError::AuthenticationFailed { .. } | ScwError::PermissionDenied { .. }
            )
        })
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.check(|e| matches!(e, ScwError::Conflict { .. }))
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.check(|e| matches!(e, ScwError::RateLimited { .. }))
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.check(|e| matches!(e, ScwError::ServerError { .. }))
    }

    /// Returns true if this is a bad request error (400) or a rejected argument
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.check(|e| {
            matches!(
                e,
                ScwError::BadRequest { .. }
                    | ScwError::InvalidArgument(_)
                    | ScwError::InvalidLocality(_)
            )
        })
    }

    /// Returns true if this is a timeout, including an exhausted waiter
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.check(|e| match e {
            ScwError::Transport(err) => err.is_timeout(),
            ScwError::MaxRetriesExceeded { .. } => true,
            _ => false,
        })
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.check(|e| match e {
            ScwError::RateLimited { .. } | ScwError::ServerError { .. } => true,
            ScwError::MaxRetriesExceeded { .. } => true,
            ScwError::Transport(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        })
    }
}

/// Attach context to the error side of a [`Result`]
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}

/// An ordered collection of errors that displays as one error per line
///
/// Sweepers keep going after a failure and hand back everything that went
/// wrong through this type.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<ScwError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error, flattening nested lists
    pub fn push(&mut self, err: ScwError) {
        match err {
            ScwError::Multiple(list) => self.errors.extend(list.errors),
            other => self.errors.push(other),
        }
    }

    /// Record the error side of `result`, if any
    pub fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScwError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ScwError> {
        self.errors
    }

    /// `Ok(())` when nothing was recorded, the combined error otherwise
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ScwError::Multiple(self))
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Extend<ScwError> for ErrorList {
    fn extend<I: IntoIterator<Item = ScwError>>(&mut self, iter: I) {
        for err in iter {
            self.push(err);
        }
    }
}

impl FromIterator<ScwError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = ScwError>>(iter: I) -> Self {
        let mut list = ErrorList::new();
        list.extend(iter);
        list
    }
}

impl IntoIterator for ErrorList {
    type Item = ScwError;
    type IntoIter = std::vec::IntoIter<ScwError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
