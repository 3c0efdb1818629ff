//! Exploratory plots of a medical examination dataset.
//!
//! The examination table is loaded once, enriched with an `overweight` flag
//! and binarized `cholesterol`/`gluc` columns, and then shared read-only by
//! the two plot builders:
//!
//! * [`MedicalVisualizer::draw_cat_plot`] counts the indicator columns per
//!   `cardio` value and writes `catplot.png`;
//! * [`MedicalVisualizer::draw_heat_map`] drops outliers, correlates every
//!   numeric column and writes `heatmap.png`.

pub mod cat_plot;
pub mod config;
pub mod error;
pub mod features;
pub mod heat_map;
pub mod loader;
pub mod records;
pub mod render;
pub mod stats;

use std::path::PathBuf;

use log::info;
use polars::prelude::DataFrame;
use serde::Serialize;

pub use cat_plot::{CatPlotFigure, CategoryCount};
pub use config::{VisualizerArgs, VisualizerConfig};
pub use error::{Result, VisualizerError};
pub use heat_map::{CorrelationMatrix, HeatMapFigure, OutlierThresholds};
pub use records::ExaminationRecord;

/// The derived examination table plus the settings both plots are drawn with.
pub struct MedicalVisualizer {
    df: DataFrame,
    config: VisualizerConfig,
}

impl MedicalVisualizer {
    /// Derives the feature columns from a freshly loaded table.
    pub fn new(raw: &DataFrame, config: VisualizerConfig) -> Result<Self> {
        config.validate()?;
        let df = features::derive_features(raw)?;
        Ok(MedicalVisualizer { df, config })
    }

    /// Loads `config.input` and derives the feature columns.
    pub async fn load(config: VisualizerConfig) -> Result<Self> {
        let raw = loader::read_csv(&config.input).await?;
        MedicalVisualizer::new(&raw, config)
    }

    pub fn data(&self) -> &DataFrame {
        &self.df
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn draw_cat_plot(&self) -> Result<CatPlotFigure> {
        let path = self.config.cat_plot_path();
        let figure = cat_plot::draw_cat_plot(&self.df, &path, self.config.cat_plot_size)?;
        if self.config.export_data {
            loader::write_csv(path.with_extension("csv"), &mut figure.to_frame()?)?;
        }
        Ok(figure)
    }

    pub fn draw_heat_map(&self) -> Result<HeatMapFigure> {
        let path = self.config.heat_map_path();
        let figure = heat_map::draw_heat_map(
            &self.df,
            &path,
            self.config.heat_map_size,
            self.config.lower_quantile,
            self.config.upper_quantile,
        )?;
        if self.config.export_data {
            loader::write_csv(
                path.with_extension("csv"),
                &mut figure.correlation.to_frame()?,
            )?;
        }
        Ok(figure)
    }

    /// Draws both plots, categorical plot first.
    pub fn run(&self) -> Result<RunSummary> {
        let cat_plot = self.draw_cat_plot()?;
        let heat_map = self.draw_heat_map()?;
        let summary = RunSummary::new(&self.df, &cat_plot, &heat_map);
        info!(
            "drew {} and {}",
            summary.cat_plot.display(),
            summary.heat_map.display()
        );
        Ok(summary)
    }
}

/// Machine readable outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub heat_map_rows: usize,
    pub thresholds: OutlierThresholds,
    pub cardio_panels: Vec<i64>,
    pub cat_plot: PathBuf,
    pub heat_map: PathBuf,
}

impl RunSummary {
    fn new(df: &DataFrame, cat_plot: &CatPlotFigure, heat_map: &HeatMapFigure) -> Self {
        RunSummary {
            rows_loaded: df.height(),
            heat_map_rows: heat_map.rows_used,
            thresholds: heat_map.thresholds,
            cardio_panels: cat_plot.panels.clone(),
            cat_plot: cat_plot.path.clone(),
            heat_map: heat_map.path.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
