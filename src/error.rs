use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisualizerError>;

#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("column {column:?} missing from {path:?}")]
    MissingColumn { column: String, path: PathBuf },
    #[error("table has no rows to compute {what} from")]
    EmptyTable { what: &'static str },
    #[error("could not render {path:?}: {message}")]
    Render { path: PathBuf, message: String },
    #[error("invalid config {path:?}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("invalid quantile range [{lower}, {upper}]")]
    QuantileRange { lower: f64, upper: f64 },
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl VisualizerError {
    /// Wraps any drawing backend error for the image at `path`.
    pub(crate) fn render<E: std::fmt::Display>(path: impl Into<PathBuf>, error: E) -> Self {
        VisualizerError::Render {
            path: path.into(),
            message: error.to_string(),
        }
    }
}
