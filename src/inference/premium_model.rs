use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::inference::{FeatureMap, FeatureValue, Prediction, PredictionError, Predictor};

/// Multinomial linear classifier over the premium features, stored as JSON.
///
/// Every class `k` gets the score `intercepts[k] + sum(contribution_k(feature))`, and the class
/// with the highest score is the prediction.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct PremiumModel {
    version: String,
    classes: Vec<String>,
    intercepts: Vec<f64>,
    features: BTreeMap<String, FeatureWeights>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum FeatureWeights {
    /// Contributes `weights[k] * (x - mean) / scale`
    Numeric {
        mean: f64,
        scale: f64,
        weights: Vec<f64>,
    },
    /// One weight vector per known category
    Categorical(BTreeMap<String, Vec<f64>>),
}

impl PremiumModel {
    #[tracing::instrument(level = "trace")]
    pub fn from_file(path: &Path) -> Result<Self> {
        let str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        Self::from_json(&str).with_context(|| format!("Invalid model file {}", path.display()))
    }

    pub fn from_json(str: &str) -> Result<Self> {
        let model: PremiumModel = serde_json::from_str(str)?;
        model.check()?;
        Ok(model)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    fn check(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            bail!("Model version is empty");
        }
        if self.classes.is_empty() {
            bail!("Model has no classes");
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.classes.iter().find(|c| !seen.insert(c.as_str())) {
            bail!("Class {} is declared more than once", duplicate);
        }

        let class_count = self.classes.len();
        if self.intercepts.len() != class_count {
            bail!(
                "Expected {} intercepts but found {}",
                class_count,
                self.intercepts.len()
            );
        }
        for (name, weights) in &self.features {
            match weights {
                FeatureWeights::Numeric { scale, weights, .. } => {
                    if !scale.is_finite() || *scale == 0.0 {
                        bail!("Feature {} has an invalid scale {}", name, scale);
                    }
                    check_weights(name, weights, class_count)?;
                }
                FeatureWeights::Categorical(categories) => {
                    if categories.is_empty() {
                        bail!("Feature {} has no categories", name);
                    }
                    for (category, weights) in categories {
                        check_weights(&format!("{name}={category}"), weights, class_count)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_weights(name: &str, weights: &[f64], class_count: usize) -> Result<()> {
    if weights.len() != class_count {
        bail!(
            "Feature {} has {} weights, expected one per class ({})",
            name,
            weights.len(),
            class_count
        );
    }
    Ok(())
}

impl Predictor for PremiumModel {
    fn version(&self) -> &str {
        &self.version
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn predict(&self, features: &FeatureMap) -> Result<Prediction, PredictionError> {
        let mut scores = self.intercepts.clone();

        for (name, weights) in &self.features {
            let value = features
                .get(name.as_str())
                .ok_or_else(|| PredictionError::MissingFeature(name.clone()))?;
            let contribution: Vec<f64> = match (weights, value) {
                (
                    FeatureWeights::Numeric {
                        mean,
                        scale,
                        weights,
                    },
                    FeatureValue::Number(x),
                ) => {
                    let standardized = (x - mean) / scale;
                    weights.iter().map(|w| w * standardized).collect()
                }
                (FeatureWeights::Categorical(categories), FeatureValue::Category(category)) => {
                    categories
                        .get(*category)
                        .ok_or_else(|| PredictionError::UnknownCategory {
                            feature: name.clone(),
                            value: category.to_string(),
                        })?
                        .clone()
                }
                _ => {
                    return Err(PredictionError::KindMismatch {
                        feature: name.clone(),
                    })
                }
            };
            for (score, delta) in scores.iter_mut().zip(contribution) {
                *score += delta;
            }
        }

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PredictionError::NonFiniteScore);
        }

        let mut best = 0;
        for (index, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = index;
            }
        }
        Ok(Prediction(self.classes[best].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "version": "test-1",
        "classes": ["Low", "Medium", "High"],
        "intercepts": [0.0, 0.5, 0.0],
        "features": {
            "bmi": { "numeric": { "mean": 25.0, "scale": 5.0, "weights": [-1.0, 0.0, 1.0] } },
            "lifestyle_risk": {
                "categorical": {
                    "low": [1.0, 0.0, -1.0],
                    "high": [-1.0, 0.0, 2.0]
                }
            }
        }
    }"#;

    fn features(bmi: f64, risk: &'static str) -> FeatureMap {
        FeatureMap::from([
            ("bmi", FeatureValue::Number(bmi)),
            ("lifestyle_risk", FeatureValue::Category(risk)),
        ])
    }

    #[test]
    fn picks_highest_scoring_class() {
        let model = PremiumModel::from_json(MODEL).unwrap();
        assert_eq!(model.version(), "test-1");
        assert_eq!(
            model.predict(&features(25.0, "low")).unwrap(),
            Prediction::from("Low")
        );
        assert_eq!(
            model.predict(&features(35.0, "high")).unwrap(),
            Prediction::from("High")
        );
    }

    #[test]
    fn extra_features_are_ignored() {
        let model = PremiumModel::from_json(MODEL).unwrap();
        let mut input = features(25.0, "low");
        input.insert("occupation", FeatureValue::Category("salaried"));
        assert_eq!(model.predict(&input).unwrap(), Prediction::from("Low"));
    }

    #[test]
    fn ties_go_to_first_class() {
        let model = PremiumModel::from_json(
            r#"{"version": "v", "classes": ["A", "B"], "intercepts": [1.0, 1.0], "features": {}}"#,
        )
        .unwrap();
        assert_eq!(
            model.predict(&FeatureMap::new()).unwrap(),
            Prediction::from("A")
        );
    }

    #[test]
    fn reports_prediction_faults() {
        let model = PremiumModel::from_json(MODEL).unwrap();

        let missing = FeatureMap::from([("bmi", FeatureValue::Number(20.0))]);
        assert_eq!(
            model.predict(&missing),
            Err(PredictionError::MissingFeature("lifestyle_risk".into()))
        );

        assert_eq!(
            model.predict(&features(20.0, "medium")),
            Err(PredictionError::UnknownCategory {
                feature: "lifestyle_risk".into(),
                value: "medium".into()
            })
        );

        let mismatched = FeatureMap::from([
            ("bmi", FeatureValue::Category("tall")),
            ("lifestyle_risk", FeatureValue::Category("low")),
        ]);
        assert_eq!(
            model.predict(&mismatched),
            Err(PredictionError::KindMismatch {
                feature: "bmi".into()
            })
        );

        assert_eq!(
            model.predict(&features(f64::INFINITY, "low")),
            Err(PredictionError::NonFiniteScore)
        );
    }

    #[test]
    fn rejects_malformed_artifacts() {
        let cases = [
            r#"{"version": "", "classes": ["A"], "intercepts": [0.0], "features": {}}"#,
            r#"{"version": "v", "classes": [], "intercepts": [], "features": {}}"#,
            r#"{"version": "v", "classes": ["A", "A"], "intercepts": [0.0, 0.0], "features": {}}"#,
            r#"{"version": "v", "classes": ["A", "B"], "intercepts": [0.0], "features": {}}"#,
            r#"{"version": "v", "classes": ["A"], "intercepts": [0.0],
                "features": {"bmi": {"numeric": {"mean": 0.0, "scale": 0.0, "weights": [1.0]}}}}"#,
            r#"{"version": "v", "classes": ["A"], "intercepts": [0.0],
                "features": {"bmi": {"numeric": {"mean": 0.0, "scale": 1.0, "weights": [1.0, 2.0]}}}}"#,
            r#"{"version": "v", "classes": ["A"], "intercepts": [0.0],
                "features": {"job": {"categorical": {}}}}"#,
            r#"{"version": "v", "classes": ["A"], "intercepts": [0.0], "features": {}, "extra": 1}"#,
            "not json",
        ];
        for case in cases {
            assert!(PremiumModel::from_json(case).is_err(), "accepted {case}");
        }
    }

    #[test]
    fn bundled_artifact_covers_every_input_field() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("model/model.json");
        let model = PremiumModel::from_file(&path).unwrap();
        let names: Vec<&str> = model.feature_names().collect();
        assert_eq!(
            names,
            [
                "age_group",
                "bmi",
                "city_tier",
                "income_lpa",
                "lifestyle_risk",
                "occupation"
            ]
        );
        assert_eq!(model.classes(), ["Low", "Medium", "High"]);
    }
}
