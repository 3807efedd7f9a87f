//! JSON responses and the error-to-HTTP mapping
//!
//! Failed requests are answered with `{"error": ..., "detail"?: {...}}`.
//! Only the effective message leaves the process; the full error, cause
//! included, is logged once per request.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::error::{self, chain, is_interrupted, Code, Error};
use crate::validation::{Translator, ValidationFailure};

pub const INTERRUPTED_MESSAGE: &str = "request canceled or deadline exceeded";
pub const INVALID_DATA_MESSAGE: &str = "invalid data provided";

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }
}

/// Serialize `data` as a JSON response with the given status.
///
/// Serialization failures are logged and answered with an empty body.
pub fn respond_json<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Response {
    let body = match serde_json::to_vec(data) {
        Ok(bytes) => Body::from(bytes),
        Err(e) => {
            tracing::error!(error = %e, "Failed to write response");
            Body::empty()
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Translate any error into its HTTP response.
///
/// Checked in order: cancellation or deadline (408), field validation
/// failure (422), then the tagged error's own status and message.
///
/// A [`ValidationFailure`] is rendered with the translator it carries;
/// bare `ValidationErrors` fall back to `translator`.
pub fn respond(err: &Error, translator: &Translator) -> Response {
    if is_interrupted(err) {
        tracing::warn!(
            status = StatusCode::REQUEST_TIMEOUT.as_u16(),
            code = %err.code(),
            error = %err,
            "Request interrupted"
        );
        return respond_json(
            StatusCode::REQUEST_TIMEOUT,
            &ErrorBody::new(INTERRUPTED_MESSAGE),
        );
    }

    if let Some(failure) = find_cause::<ValidationFailure>(err) {
        return validation_response(failure.errors(), failure.translator());
    }
    if let Some(errors) = find_cause::<ValidationErrors>(err) {
        return validation_response(errors, translator);
    }

    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(
            status = status.as_u16(),
            code = %err.code(),
            error = %err,
            "{}",
            err.message()
        );
    } else {
        tracing::warn!(
            status = status.as_u16(),
            code = %err.code(),
            error = %err,
            "{}",
            err.message()
        );
    }

    respond_json(status, &ErrorBody::new(err.message()))
}

/// 422 response listing one translated message per invalid field
pub fn validation_response(errors: &ValidationErrors, translator: &Translator) -> Response {
    let detail = translator.translate_all(errors);

    tracing::warn!(
        status = StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
        code = %Code::Invalid,
        error = %errors,
        fields = ?detail.keys().collect::<Vec<_>>(),
        "Validation failed"
    );

    respond_json(
        StatusCode::UNPROCESSABLE_ENTITY,
        &ErrorBody {
            error: INVALID_DATA_MESSAGE.to_string(),
            detail: (!detail.is_empty()).then_some(detail),
        },
    )
}

/// Respond to an arbitrary error, tagging it first if needed.
pub fn respond_any(err: impl Into<error::BoxError>, translator: &Translator) -> Response {
    respond(&Error::wrap(err), translator)
}

fn find_cause<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    chain(err).find_map(|e| e.downcast_ref::<T>())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        respond(&self, &Translator::default())
    }
}
