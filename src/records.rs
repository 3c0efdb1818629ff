use std::fs::File;
use std::path::Path;

use polars::prelude::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VisualizerError};

/// Column carrying the cardiovascular disease flag, the key of the categorical plot.
pub const CARDIO: &str = "cardio";

/// Derived BMI indicator column.
pub const OVERWEIGHT: &str = "overweight";

/// Indicator columns melted against `cardio`, in plotting order.
pub const INDICATOR_COLUMNS: [&str; 6] = [
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    OVERWEIGHT,
];

/// Columns every input file has to provide.
pub const RAW_COLUMNS: [&str; 13] = [
    "id",
    "age",
    "gender",
    "height",
    "weight",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    CARDIO,
];

/// One patient examination, as stored in `medical_examination.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExaminationRecord {
    pub id: i64,
    pub age: i64,
    pub gender: i64,
    pub height: i64,
    pub weight: f64,
    pub ap_hi: i64,
    pub ap_lo: i64,
    pub cholesterol: i64,
    pub gluc: i64,
    pub smoke: i64,
    pub alco: i64,
    pub active: i64,
    pub cardio: i64,
}

impl ExaminationRecord {
    pub fn raw_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id", DataType::Int64),
            Field::new("age", DataType::Int64),
            Field::new("gender", DataType::Int64),
            Field::new("height", DataType::Int64),
            Field::new("weight", DataType::Float64),
            Field::new("ap_hi", DataType::Int64),
            Field::new("ap_lo", DataType::Int64),
            Field::new("cholesterol", DataType::Int64),
            Field::new("gluc", DataType::Int64),
            Field::new("smoke", DataType::Int64),
            Field::new("alco", DataType::Int64),
            Field::new("active", DataType::Int64),
            Field::new(CARDIO, DataType::Int64),
        ])
    }

    /// Writes `records` as a headed CSV file in the layout the loader expects.
    pub fn write_csv<P: AsRef<Path>>(path: P, records: &[ExaminationRecord]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| VisualizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|source| VisualizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
