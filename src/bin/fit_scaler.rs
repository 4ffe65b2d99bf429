//! Offline fitting of the per-feature scaling bounds.
//!
//! Reads the training table, computes min and max for the thirteen training
//! columns in training order, and writes the scaler artifact next to the
//! classifier. Run once whenever the training data changes; the serving
//! process only ever reads the persisted bounds.

use std::fs::File;

use env_logger::Env;
use log::info;
use polars::prelude::*;

use heart_forecaster::encoding::FEATURE_COLUMNS;
use heart_forecaster::scaling::ScalerParams;
use heart_forecaster::{SCALER_PATH, TRAINING_DATA_PATH};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let df = read_csv(TRAINING_DATA_PATH)?;
    info!("{} training rows from {TRAINING_DATA_PATH}", df.height());

    let mut min = Vec::with_capacity(FEATURE_COLUMNS.len());
    let mut max = Vec::with_capacity(FEATURE_COLUMNS.len());
    for name in FEATURE_COLUMNS {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let lo: f64 = column
            .min()
            .ok_or_else(|| format!("column {name} has no numeric values"))?;
        let hi: f64 = column
            .max()
            .ok_or_else(|| format!("column {name} has no numeric values"))?;
        if lo >= hi {
            return Err(format!("column {name} is constant at {lo}; bounds would be degenerate").into());
        }
        info!("{name}: min {lo}, max {hi}");
        min.push(lo);
        max.push(hi);
    }

    let params = ScalerParams {
        columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        min,
        max,
    };
    let out = File::create(SCALER_PATH)?;
    serde_json::to_writer_pretty(out, &params)?;
    info!("wrote {SCALER_PATH}");
    Ok(())
}

fn read_csv(path: &str) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    Ok(CsvReader::new(file).has_header(true).finish()?)
}
