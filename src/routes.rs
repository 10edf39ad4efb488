use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::bail_api;
use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::extractors::ValidatedJson;
use crate::inference::ModelState;
use crate::schema::prediction_response::PredictionResponse;
use crate::schema::user_input::UserInput;

pub(crate) const WELCOME_MESSAGE: &str = "Welcome to the Insurance Premium Predictor API. Use the /predict endpoint to get predictions.";
pub(crate) const MODEL_NOT_LOADED: &str =
    "Model not loaded. Ensure model file exists and is accessible.";
pub(crate) const PREDICTION_FAILED: &str = "Prediction failed";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) model: ModelState,
}

#[derive(Serialize, Debug)]
pub(crate) struct RootResponse {
    message: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub(crate) enum HealthResponse {
    Ok {
        status: &'static str,
        model_loaded: bool,
        model_version: String,
    },
    Unavailable {
        status: &'static str,
        model_loaded: bool,
        message: &'static str,
    },
}

pub(crate) fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/predict", post(handle_predict))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[axum_macros::debug_handler]
async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: WELCOME_MESSAGE,
    })
}

#[tracing::instrument(level = "debug", skip_all)]
async fn handle_health(State(state): State<AppState>) -> Response {
    match state.model.predictor() {
        Some(predictor) => (
            StatusCode::OK,
            Json(HealthResponse::Ok {
                status: "ok",
                model_loaded: true,
                model_version: predictor.version().to_string(),
            }),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::Unavailable {
                status: "error",
                model_loaded: false,
                message: MODEL_NOT_LOADED,
            }),
        )
            .into_response(),
    }
}

#[tracing::instrument(level = "info", skip_all)]
async fn handle_predict(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UserInput>,
) -> ApiResult<(StatusCode, Json<PredictionResponse>)> {
    let predictor = match &state.model {
        ModelState::Loaded(predictor) => predictor,
        ModelState::NotLoaded { reason } => {
            warn!("Rejecting prediction, model not loaded: {}", reason);
            bail_api!(StatusCode::INTERNAL_SERVER_ERROR, MODEL_NOT_LOADED)
        }
    };

    let features = input.to_features();
    match predictor.predict(&features) {
        Ok(prediction) => Ok((StatusCode::OK, Json(prediction.into()))),
        Err(err) => {
            error!(
                error = ?err,
                ?features,
                model_version = predictor.version(),
                "Prediction failed: {}",
                err
            );
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorBody::with_detail(PREDICTION_FAILED, err.to_string()),
            })
        }
    }
}
