//! Heart disease risk forecasting service.
//!
//! A submitted patient record is encoded into the fixed-order numeric
//! feature vector the classifier was trained on, rescaled with bounds fitted
//! once from the training data, and classified into one of two outcomes.
//! The classifier and scaler artifacts are loaded once at startup and never
//! change afterwards.

pub mod encoding;
pub mod error;
pub mod model;
pub mod records;
pub mod scaling;
pub mod server;

// Artifact locations, fixed for the process lifetime. The scaler bounds are
// fitted offline by the `fit_scaler` binary and must sit next to the
// classifier they were fitted for.
pub static CLASSIFIER_PATH: &str = "model/classifier.json";
pub static SCALER_PATH: &str = "model/scaler.json";
pub static TRAINING_DATA_PATH: &str = "data/heart.csv";
