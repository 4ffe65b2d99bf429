//! Startup: logging, artifact loading, then the serving loop.

use std::path::Path;

use env_logger::Env;
use log::info;

use heart_forecaster::model::Predictor;
use heart_forecaster::{server, CLASSIFIER_PATH, SCALER_PATH};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("loading classifier {CLASSIFIER_PATH} and scaler {SCALER_PATH}");
    // Artifact problems are fatal here, before the listener ever binds.
    let predictor = Predictor::load(Path::new(CLASSIFIER_PATH), Path::new(SCALER_PATH))?;

    server::run(predictor).await?;
    Ok(())
}
