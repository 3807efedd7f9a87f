//! Custom axum extractors

use axum::{
    extract::{rejection::JsonRejection, FromRef, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{Code, Error};
use crate::response::{respond, respond_json, validation_response, ErrorBody};
use crate::validation::{ValidationFailure, Validator};

/// JSON extractor that validates the deserialized value automatically.
///
/// The [`Validator`] is taken from router state, so field names in the
/// 422 detail follow whatever the service configured at startup.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// Rejection type for `ValidatedJson`:
/// - Malformed or mistyped JSON → 400
/// - Other body rejections keep axum's status (415 missing content type,
///   413 body too large)
/// - Validation errors → 422 with per-field detail
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Validation(ValidationFailure),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            ValidatedJsonRejection::Json(
                e @ (JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_)),
            ) => {
                let err = Error::new(e.body_text())
                    .with_code(Code::Invalid)
                    .with_cause(e);
                respond(&err, &Default::default())
            }
            ValidatedJsonRejection::Json(e) => {
                let status = e.status();
                tracing::warn!(
                    status = status.as_u16(),
                    code = %Code::Invalid,
                    error = %e,
                    "Request body rejected"
                );
                respond_json(status, &ErrorBody::new(e.body_text()))
            }
            ValidatedJsonRejection::Validation(failure) => {
                validation_response(failure.errors(), failure.translator())
            }
        }
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    Validator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;

        Validator::from_ref(state)
            .validate(&value)
            .map_err(ValidatedJsonRejection::Validation)?;

        Ok(ValidatedJson(value))
    }
}
