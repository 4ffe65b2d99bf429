//! Feature rescaling with bounds fitted once from the training data.
//!
//! Fitting min-max bounds against a single incoming row would collapse every
//! submission to a constant vector, so the bounds are fitted offline by the
//! `fit_scaler` binary, persisted next to the classifier, and applied
//! unchanged to every request.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoding::FEATURE_COLUMNS;
use crate::error::{ForecastError, Result};

/// Per-feature min-max bounds in training column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Training column names, in the order the bounds were fitted.
    pub columns: Vec<String>,
    /// Per-column training minimum.
    pub min: Vec<f64>,
    /// Per-column training maximum.
    pub max: Vec<f64>,
}

impl ScalerParams {
    /// Load and validate persisted bounds. A missing file, malformed JSON,
    /// misordered columns, or a degenerate range all count as a corrupt
    /// artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ForecastError::model_load(path, e))?;
        let params: ScalerParams =
            serde_json::from_reader(file).map_err(|e| ForecastError::model_load(path, e))?;
        params
            .check()
            .map_err(|reason| ForecastError::model_load(path, reason))?;
        Ok(params)
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.columns.len() != FEATURE_COLUMNS.len()
            || self.min.len() != self.columns.len()
            || self.max.len() != self.columns.len()
        {
            return Err(format!(
                "expected {} columns with matching bounds, got {} columns, {} mins, {} maxs",
                FEATURE_COLUMNS.len(),
                self.columns.len(),
                self.min.len(),
                self.max.len()
            ));
        }
        for (fitted, expected) in self.columns.iter().zip(FEATURE_COLUMNS) {
            if fitted != expected {
                return Err(format!(
                    "column order mismatch: artifact has {fitted:?} where the model expects {expected:?}"
                ));
            }
        }
        for (i, (lo, hi)) in self.min.iter().zip(&self.max).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(format!(
                    "degenerate bounds [{lo}, {hi}] for column {:?}",
                    self.columns[i]
                ));
            }
        }
        Ok(())
    }

    /// Rescale an encoded vector with the fitted bounds. Identical input
    /// always yields identical output. Values outside the training bounds
    /// map linearly beyond [0, 1]; there is no clamping.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.columns.len() {
            return Err(ForecastError::FeatureShape {
                expected: self.columns.len(),
                got: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(x, (lo, hi))| (x - lo) / (hi - lo))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn params() -> ScalerParams {
        ScalerParams {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            min: vec![0.0; FEATURE_COLUMNS.len()],
            max: vec![2.0; FEATURE_COLUMNS.len()],
        }
    }

    fn write_artifact(params: &ScalerParams) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(params).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn transform_applies_fitted_bounds() {
        let mut input = vec![1.0; FEATURE_COLUMNS.len()];
        input[0] = 0.0;
        input[12] = 2.0;
        let scaled = params().transform(&input).unwrap();
        assert_eq!(scaled[0], 0.0);
        assert_eq!(scaled[1], 0.5);
        assert_eq!(scaled[12], 1.0);
    }

    #[test]
    fn transform_is_deterministic() {
        let input: Vec<f64> = (0..13).map(|i| i as f64 / 7.0).collect();
        let params = params();
        assert_eq!(params.transform(&input).unwrap(), params.transform(&input).unwrap());
    }

    #[test]
    fn wrong_arity_is_a_shape_error() {
        match params().transform(&[1.0, 2.0]) {
            Err(ForecastError::FeatureShape { expected: 13, got: 2 }) => {}
            other => panic!("expected FeatureShape, got {other:?}"),
        }
    }

    #[test]
    fn load_roundtrip() {
        let file = write_artifact(&params());
        let loaded = ScalerParams::load(file.path()).unwrap();
        assert_eq!(loaded.columns, params().columns);
        assert_eq!(loaded.max, params().max);
    }

    #[test]
    fn missing_artifact_fails_to_load() {
        let err = ScalerParams::load(Path::new("model/no-such-scaler.json")).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoad { .. }));
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        let mut bad = params();
        bad.max[4] = bad.min[4];
        let err = ScalerParams::load(write_artifact(&bad).path()).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoad { .. }));
        assert!(err.to_string().contains("degenerate"));
    }

    #[test]
    fn misordered_columns_are_rejected() {
        let mut bad = params();
        bad.columns.swap(0, 1);
        let err = ScalerParams::load(write_artifact(&bad).path()).unwrap_err();
        assert!(err.to_string().contains("column order mismatch"));
    }
}
