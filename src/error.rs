use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

// Taken from https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) detail: Option<String>,
}

impl ErrorBody {
    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

impl From<&str> for ErrorBody {
    fn from(message: &str) -> Self {
        ErrorBody {
            error: message.to_string(),
            detail: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut res = Json(self.body).into_response();
        *res.status_mut() = self.status;
        res
    }
}

pub type ApiResult<T, E = ApiError> = Result<T, E>;

#[macro_export]
macro_rules! bail_api {
    ($status_code:expr, $error_message:expr) => {
        return Err($crate::error::ApiError {
            status: $status_code,
            body: $crate::error::ErrorBody::from($error_message),
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_omitted_when_absent() {
        let body = serde_json::to_value(ErrorBody::from("Model not loaded")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Model not loaded" }));
    }

    #[test]
    fn detail_is_serialized_when_present() {
        let body = serde_json::to_value(ErrorBody::with_detail("Prediction failed", "boom")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Prediction failed", "detail": "boom" })
        );
    }

    #[test]
    fn bail_api_returns_status_and_message() {
        fn fails() -> ApiResult<()> {
            bail_api!(StatusCode::SERVICE_UNAVAILABLE, "Model not loaded")
        }
        let err = fails().unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body, ErrorBody::from("Model not loaded"));
    }
}
