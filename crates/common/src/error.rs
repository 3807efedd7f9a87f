//! Tagged application error and its category codes
//!
//! Every error that reaches the HTTP boundary is projected onto a [`Code`],
//! which decides the response status and the default message shown to the
//! caller. The underlying cause is kept for logging only.

use std::{error::Error as StdError, fmt, str::FromStr};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error accepted as a cause
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error category. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Code {
    Conflict,
    #[default]
    Internal,
    Forbidden,
    Invalid,
    NotFound,
    NotImplemented,
    Unauthorized,
}

impl Code {
    pub const ALL: [Code; 7] = [
        Code::Conflict,
        Code::Internal,
        Code::Forbidden,
        Code::Invalid,
        Code::NotFound,
        Code::NotImplemented,
        Code::Unauthorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Conflict => "conflict",
            Code::Internal => "internal",
            Code::Forbidden => "forbidden",
            Code::Invalid => "invalid",
            Code::NotFound => "not-found",
            Code::NotImplemented => "not-implemented",
            Code::Unauthorized => "unauthorized",
        }
    }

    /// Message shown when the error carries no override
    pub fn default_message(&self) -> &'static str {
        match self {
            Code::Conflict => "conflict",
            Code::Internal => "internal server error",
            Code::Forbidden => "forbidden",
            Code::Invalid => "invalid request",
            Code::NotFound => "resource not found",
            Code::NotImplemented => "not implemented",
            Code::Unauthorized => "unauthorized",
        }
    }

    /// Get the appropriate HTTP status code for this category
    pub fn status_code(&self) -> StatusCode {
        match self {
            Code::Conflict => StatusCode::CONFLICT,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Code::Forbidden => StatusCode::FORBIDDEN,
            Code::Invalid => StatusCode::BAD_REQUEST,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Code::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Parse a code, treating anything unrecognized as [`Code::Internal`].
    pub fn from_str_lossy(s: &str) -> Code {
        s.parse().unwrap_or(Code::Internal)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`Code`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code: {0}")]
pub struct UnknownCode(pub String);

impl FromStr for Code {
    type Err = UnknownCode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Code::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownCode(s.to_string()))
    }
}

/// Cancellation or deadline condition raised while serving a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl From<tokio::time::error::Elapsed> for Interrupted {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Interrupted::DeadlineExceeded
    }
}

/// Whether `err` or anything in its cause chain is a cancellation or timeout.
pub fn is_interrupted(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|e| {
        e.is::<Interrupted>()
            || e.is::<tokio::time::error::Elapsed>()
            || e.downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
    })
}

/// Iterate over `err` and its sources, outermost first.
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |e: &&'a (dyn StdError + 'static)| (*e).source())
}

/// Tagged application error: optional cause, category code and message override
#[derive(Debug, Default)]
pub struct Error {
    cause: Option<BoxError>,
    code: Option<Code>,
    message: Option<String>,
}

impl Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn from_code(code: Code) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// Wrap an arbitrary error.
    ///
    /// An `Error` is returned as is. When one sits deeper in the cause chain
    /// its code and message are carried over so the outer context is kept
    /// without changing how the error is reported.
    pub fn wrap(err: impl Into<BoxError>) -> Self {
        let boxed: BoxError = err.into();
        let boxed = match boxed.downcast::<Error>() {
            Ok(e) => return *e,
            Err(other) => other,
        };

        let (code, message) = match find(&*boxed) {
            Some(inner) => (inner.code, inner.message.clone()),
            None => (None, None),
        };

        Self {
            cause: Some(boxed),
            code,
            message,
        }
    }

    pub fn with_code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Effective code; [`Code::Internal`] when none was set
    pub fn code(&self) -> Code {
        self.code.unwrap_or_default()
    }

    /// Effective message: the override, else the code's default
    pub fn message(&self) -> &str {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message,
            _ => self.code().default_message(),
        }
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    pub fn not_found() -> Self {
        Self::from_code(Code::NotFound)
    }

    pub fn conflict() -> Self {
        Self::from_code(Code::Conflict)
    }

    pub fn invalid() -> Self {
        Self::from_code(Code::Invalid)
    }

    pub fn forbidden() -> Self {
        Self::from_code(Code::Forbidden)
    }

    pub fn unauthorized() -> Self {
        Self::from_code(Code::Unauthorized)
    }

    pub fn not_implemented() -> Self {
        Self::from_code(Code::NotImplemented)
    }

    pub fn internal() -> Self {
        Self::from_code(Code::Internal)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.message(), cause),
            None => f.write_str(self.message()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl From<Code> for Error {
    fn from(code: Code) -> Self {
        Self::from_code(code)
    }
}

impl From<Interrupted> for Error {
    fn from(err: Interrupted) -> Self {
        Self::wrap(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::wrap(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::wrap(err).with_code(Code::Invalid)
    }
}

impl From<crate::validation::ValidationFailure> for Error {
    fn from(err: crate::validation::ValidationFailure) -> Self {
        Self::wrap(err).with_code(Code::Invalid)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::wrap(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::wrap(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::wrap(err)
    }
}

/// Nearest [`Error`] in the chain starting at `err`.
pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    chain(err).find_map(|e| e.downcast_ref::<Error>())
}

/// Whether the chain contains an [`Error`].
pub fn is(err: &(dyn StdError + 'static)) -> bool {
    find(err).is_some()
}

/// Code of the nearest [`Error`] in the chain, [`Code::Internal`] otherwise.
pub fn kind(err: &(dyn StdError + 'static)) -> Code {
    find(err).map(Error::code).unwrap_or_default()
}

/// Whether the effective code of `err` is one of `codes`.
pub fn has(err: &(dyn StdError + 'static), codes: &[Code]) -> bool {
    !codes.is_empty() && codes.contains(&kind(err))
}
