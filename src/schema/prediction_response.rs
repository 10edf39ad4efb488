use serde::Serialize;

use crate::inference::Prediction;

#[derive(Serialize, Debug, PartialEq)]
pub struct PredictionResponse {
    /// The premium category predicted by the model
    pub response: Prediction,
}

impl From<Prediction> for PredictionResponse {
    fn from(response: Prediction) -> Self {
        PredictionResponse { response }
    }
}
