use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, ErrorBody};
use crate::schema::Validate;

pub(crate) const INVALID_BODY: &str = "Invalid request body";

/// JSON body that has been deserialized and passed [`Validate::validate`] before the handler runs.
pub(crate) struct ValidatedJson<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(reject_json)?;

        value.validate().map_err(|err| {
            debug!("Rejected request body: {}", err);
            ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: ErrorBody::with_detail(INVALID_BODY, err.to_string()),
            }
        })?;
        Ok(ValidatedJson(value))
    }
}

fn reject_json(rejection: JsonRejection) -> ApiError {
    debug!("Rejected request body: {}", rejection.body_text());
    ApiError {
        status: rejection.status(),
        body: ErrorBody::with_detail(INVALID_BODY, rejection.body_text()),
    }
}
