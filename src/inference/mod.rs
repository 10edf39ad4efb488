use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::inference::premium_model::PremiumModel;

pub mod premium_model;

/// Feature name to value, as handed to a [`Predictor`].
pub type FeatureMap = BTreeMap<&'static str, FeatureValue>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(&'static str),
}

/// The category label produced by a model, serialized as a bare string.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Prediction(pub String);

impl From<&str> for Prediction {
    fn from(label: &str) -> Self {
        Prediction(label.to_string())
    }
}

/// Faults a prediction can raise. The messages are safe to hand to API clients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("missing feature '{0}'")]
    MissingFeature(String),
    #[error("unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },
    #[error("feature '{feature}' has the wrong kind of value")]
    KindMismatch { feature: String },
    #[error("model produced a non-finite score")]
    NonFiniteScore,
}

pub trait Predictor: Send + Sync {
    /// Version identifier of the loaded artifact
    fn version(&self) -> &str;

    fn predict(&self, features: &FeatureMap) -> Result<Prediction, PredictionError>;
}

/// Process-wide model handle, set up once at startup and only read afterwards.
#[derive(Clone)]
pub enum ModelState {
    Loaded(Arc<dyn Predictor>),
    NotLoaded { reason: Arc<str> },
}

impl ModelState {
    /// Loads the artifact at `path`. A failure is kept as [`ModelState::NotLoaded`] so the
    /// service can still start and report it through the health check.
    #[tracing::instrument(level = "info")]
    pub fn load(path: &Path) -> Self {
        match PremiumModel::from_file(path) {
            Ok(model) => {
                info!(
                    "Loaded model version {} from {}",
                    model.version(),
                    path.display()
                );
                ModelState::Loaded(Arc::new(model))
            }
            Err(err) => {
                error!("Failed to load model from {}: {:#}", path.display(), err);
                ModelState::NotLoaded {
                    reason: format!("{err:#}").into(),
                }
            }
        }
    }

    pub fn predictor(&self) -> Option<&dyn Predictor> {
        match self {
            ModelState::Loaded(predictor) => Some(predictor.as_ref()),
            ModelState::NotLoaded { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }
}

impl<P> From<P> for ModelState
where
    P: Predictor + 'static,
{
    fn from(predictor: P) -> Self {
        ModelState::Loaded(Arc::new(predictor))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_artifact_is_not_loaded() {
        let state = ModelState::load(&PathBuf::from("does/not/exist/model.json"));
        assert!(!state.is_loaded());
        assert!(state.predictor().is_none());
        match state {
            ModelState::NotLoaded { reason } => assert!(reason.contains("model.json")),
            ModelState::Loaded(_) => panic!("expected the load to fail"),
        }
    }

    #[test]
    fn bundled_artifact_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("model/model.json");
        let state = ModelState::load(&path);
        let predictor = state.predictor().expect("bundled model should load");
        assert!(!predictor.version().is_empty());
    }

    #[test]
    fn prediction_serializes_as_bare_label() {
        let value = serde_json::to_value(Prediction::from("Medium")).unwrap();
        assert_eq!(value, serde_json::json!("Medium"));
    }

    #[test]
    fn prediction_errors_have_readable_messages() {
        let err = PredictionError::UnknownCategory {
            feature: "occupation".into(),
            value: "astronaut".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown category 'astronaut' for feature 'occupation'"
        );
    }
}
