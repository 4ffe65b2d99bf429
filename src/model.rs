//! The persisted classifier and the prediction entry point.

use std::fs::File;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::LogisticRegression;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_classifier::KNNClassifier;
use smartcore::tree::decision_tree_classifier::DecisionTreeClassifier;

use crate::encoding::FEATURE_COUNT;
use crate::error::{ForecastError, Result};
use crate::scaling::ScalerParams;

type Features = DenseMatrix<f64>;
type Labels = Vec<i32>;

/// Persisted classifier, tagged with the family it was trained as.
///
/// The artifact file is serde_json over this enum; everything past the
/// `family` tag is opaque model state. Swapping the trained family only
/// changes the artifact, never the encoder or the boundary.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "family", content = "model", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    KNearest(KNNClassifier<f64, i32, Features, Labels, Euclidian<f64>>),
    LogisticRegression(LogisticRegression<f64, i32, Features, Labels>),
    DecisionTree(DecisionTreeClassifier<f64, i32, Features, Labels>),
}

impl ClassifierArtifact {
    fn predict(&self, x: &Features) -> std::result::Result<Labels, Failed> {
        match self {
            Self::KNearest(model) => model.predict(x),
            Self::LogisticRegression(model) => model.predict(x),
            Self::DecisionTree(model) => model.predict(x),
        }
    }
}

/// Binary risk outcome. The classifier was trained with class 0 meaning
/// disease likely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    HighRisk,
    LowRisk,
}

impl Prediction {
    /// Interpret a raw class label: 0 is high risk, anything else low risk.
    pub fn from_label(label: i32) -> Self {
        if label == 0 {
            Prediction::HighRisk
        } else {
            Prediction::LowRisk
        }
    }

    /// The user-facing outcome message. These two strings are the only
    /// results the service ever reports.
    pub fn message(&self) -> &'static str {
        match self {
            Prediction::HighRisk => "Warning! You have a high risk of getting a heart attack!",
            Prediction::LowRisk => "You have a lower risk of getting a heart disease!",
        }
    }
}

/// Read-only prediction state: the deserialized classifier plus the scaler
/// bounds it was trained with. Loaded once at startup and shared for the
/// process lifetime.
#[derive(Debug)]
pub struct Predictor {
    classifier: ClassifierArtifact,
    scaler: ScalerParams,
}

impl Predictor {
    /// Load both artifacts. A missing or corrupt file fails startup; no
    /// prediction is possible without them.
    pub fn load(classifier_path: &Path, scaler_path: &Path) -> Result<Self> {
        let scaler = ScalerParams::load(scaler_path)?;
        let file =
            File::open(classifier_path).map_err(|e| ForecastError::model_load(classifier_path, e))?;
        let classifier = serde_json::from_reader(file)
            .map_err(|e| ForecastError::model_load(classifier_path, e))?;
        Ok(Predictor { classifier, scaler })
    }

    /// Rescale an encoded feature vector and classify it.
    pub fn predict(&self, features: &[f64]) -> Result<Prediction> {
        if features.len() != FEATURE_COUNT {
            return Err(ForecastError::FeatureShape {
                expected: FEATURE_COUNT,
                got: features.len(),
            });
        }
        let scaled = self.scaler.transform(features)?;
        let x = DenseMatrix::new(1, FEATURE_COUNT, scaled, true);
        let labels = self.classifier.predict(&x)?;
        let label = labels
            .first()
            .copied()
            .ok_or_else(|| Failed::predict("classifier returned no label"))?;
        debug!("class label {label}");
        Ok(Prediction::from_label(label))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use smartcore::tree::decision_tree_classifier::DecisionTreeClassifierParameters;

    use super::*;
    use crate::encoding::FEATURE_COLUMNS;

    #[test]
    fn label_interpretation_is_fixed() {
        assert_eq!(Prediction::from_label(0), Prediction::HighRisk);
        assert_eq!(Prediction::from_label(1), Prediction::LowRisk);
        assert_eq!(Prediction::from_label(3), Prediction::LowRisk);
    }

    #[test]
    fn outcome_messages_are_fixed() {
        assert_eq!(
            Prediction::HighRisk.message(),
            "Warning! You have a high risk of getting a heart attack!"
        );
        assert_eq!(
            Prediction::LowRisk.message(),
            "You have a lower risk of getting a heart disease!"
        );
    }

    fn toy_row(lead: f64) -> Vec<f64> {
        let mut row = vec![0.25; FEATURE_COUNT];
        row[0] = lead;
        row
    }

    // A real artifact: a tree fitted in already-scaled space, split on the
    // first feature, persisted next to identity scaler bounds.
    fn toy_artifacts(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let rows: Vec<Vec<f64>> = vec![
            toy_row(0.95),
            toy_row(0.9),
            toy_row(0.85),
            toy_row(0.8),
            toy_row(0.05),
            toy_row(0.1),
            toy_row(0.15),
            toy_row(0.2),
        ];
        let borrowed: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
        let x = DenseMatrix::from_2d_array(&borrowed);
        let y: Vec<i32> = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let tree =
            DecisionTreeClassifier::fit(&x, &y, DecisionTreeClassifierParameters::default())
                .unwrap();

        let classifier_path = dir.join("classifier.json");
        let mut file = File::create(&classifier_path).unwrap();
        let artifact = ClassifierArtifact::DecisionTree(tree);
        file.write_all(serde_json::to_string(&artifact).unwrap().as_bytes())
            .unwrap();

        let scaler_path = dir.join("scaler.json");
        let params = ScalerParams {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            min: vec![0.0; FEATURE_COUNT],
            max: vec![1.0; FEATURE_COUNT],
        };
        let mut file = File::create(&scaler_path).unwrap();
        file.write_all(serde_json::to_string(&params).unwrap().as_bytes())
            .unwrap();

        (classifier_path, scaler_path)
    }

    #[test]
    fn artifact_names_its_family() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier_path, _) = toy_artifacts(dir.path());
        let raw = std::fs::read_to_string(classifier_path).unwrap();
        assert!(raw.contains("\"family\":\"decision_tree\""));
    }

    #[test]
    fn loaded_predictor_classifies_both_ways() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier_path, scaler_path) = toy_artifacts(dir.path());
        let predictor = Predictor::load(&classifier_path, &scaler_path).unwrap();

        assert_eq!(predictor.predict(&toy_row(0.9)).unwrap(), Prediction::HighRisk);
        assert_eq!(predictor.predict(&toy_row(0.1)).unwrap(), Prediction::LowRisk);
    }

    #[test]
    fn prediction_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier_path, scaler_path) = toy_artifacts(dir.path());
        let predictor = Predictor::load(&classifier_path, &scaler_path).unwrap();

        let input = toy_row(0.6);
        let first = predictor.predict(&input).unwrap();
        for _ in 0..5 {
            assert_eq!(predictor.predict(&input).unwrap(), first);
        }
    }

    #[test]
    fn wrong_dimensionality_is_a_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier_path, scaler_path) = toy_artifacts(dir.path());
        let predictor = Predictor::load(&classifier_path, &scaler_path).unwrap();

        match predictor.predict(&[1.0; 12]) {
            Err(ForecastError::FeatureShape { expected: 13, got: 12 }) => {}
            other => panic!("expected FeatureShape, got {other:?}"),
        }
    }

    #[test]
    fn missing_classifier_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (_, scaler_path) = toy_artifacts(dir.path());
        let err =
            Predictor::load(&dir.path().join("absent.json"), &scaler_path).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoad { .. }));
    }

    #[test]
    fn corrupt_classifier_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (classifier_path, scaler_path) = toy_artifacts(dir.path());
        std::fs::write(&classifier_path, b"not an artifact").unwrap();
        let err = Predictor::load(&classifier_path, &scaler_path).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoad { .. }));
    }
}
