use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::*;
use serde::Serialize;

use crate::error::{Result, VisualizerError};
use crate::render::{self, CAPTION_FONT, LABEL_FONT};
use crate::stats;

/// Quantile thresholds applied by the heat map filter, taken from the
/// unfiltered table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierThresholds {
    pub height: (f64, f64),
    pub weight: (f64, f64),
}

impl OutlierThresholds {
    pub fn from_frame(df: &DataFrame, lower: f64, upper: f64) -> Result<Self> {
        Ok(OutlierThresholds {
            height: stats::quantile_bounds(df, "height", lower, upper)?,
            weight: stats::quantile_bounds(df, "weight", lower, upper)?,
        })
    }

    /// Rows with a plausible blood pressure reading and height and weight
    /// inside the thresholds, bounds included.
    pub fn predicate(&self) -> Expr {
        col("ap_lo")
            .lt_eq(col("ap_hi"))
            .and(col("height").gt_eq(lit(self.height.0)))
            .and(col("height").lt_eq(lit(self.height.1)))
            .and(col("weight").gt_eq(lit(self.weight.0)))
            .and(col("weight").lt_eq(lit(self.weight.1)))
    }
}

/// Drops rows with `ap_lo > ap_hi` and height or weight outliers. All
/// conditions are one combined mask over the original rows.
pub fn filter_examinations(
    df: &DataFrame,
    lower: f64,
    upper: f64,
) -> Result<(DataFrame, OutlierThresholds)> {
    let thresholds = OutlierThresholds::from_frame(df, lower, upper)?;
    debug!("outlier thresholds {:?}", thresholds);

    let filtered = df.clone().lazy().filter(thresholds.predicate()).collect()?;
    info!(
        "heat map keeps {} of {} examinations",
        filtered.height(),
        df.height()
    );
    Ok((filtered, thresholds))
}

/// Square matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == column)?;
        Some(self.values[i][j])
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.len()).all(|i| {
            (0..i).all(|j| {
                let (a, b) = (self.values[i][j], self.values[j][i]);
                (a.is_nan() && b.is_nan()) || (a - b).abs() <= tolerance
            })
        })
    }

    /// The matrix as a frame with a leading `column` label column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = vec![Series::new("column", self.labels.clone())];
        for (j, label) in self.labels.iter().enumerate() {
            let values: Vec<f64> = self.values.iter().map(|row| row[j]).collect();
            columns.push(Series::new(label, values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Correlates every numeric column of `df` with every other, keeping the
/// frame's column order.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let mut labels = Vec::new();
    let mut columns = Vec::new();
    for series in df.get_columns() {
        if series.dtype().is_numeric() {
            labels.push(series.name().to_string());
            columns.push(series.cast(&DataType::Float64)?);
        }
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let r = stats::pearson(columns[i].f64()?, columns[j].f64()?)?;
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix { labels, values })
}

/// `true` marks a hidden cell: the diagonal and everything above it.
pub fn upper_triangle_mask(n: usize) -> Vec<Vec<bool>> {
    (0..n).map(|i| (0..n).map(|j| j >= i).collect()).collect()
}

/// What `draw_heat_map` drew and where it went.
#[derive(Debug, Clone)]
pub struct HeatMapFigure {
    pub path: PathBuf,
    pub correlation: CorrelationMatrix,
    pub mask: Vec<Vec<bool>>,
    pub thresholds: OutlierThresholds,
    pub rows_used: usize,
}

impl HeatMapFigure {
    /// Text printed in cell `(row, column)`, `None` where the mask hides it.
    pub fn annotation(&self, row: usize, column: usize) -> Option<String> {
        if *self.mask.get(row)?.get(column)? {
            return None;
        }
        Some(format!("{:.1}", self.correlation.values[row][column]))
    }
}

/// Filters outliers, correlates the remaining rows and draws the lower
/// triangle of the matrix as an annotated heat map at `path`.
pub fn draw_heat_map(
    df: &DataFrame,
    path: &Path,
    size: (u32, u32),
    lower: f64,
    upper: f64,
) -> Result<HeatMapFigure> {
    let (filtered, thresholds) = filter_examinations(df, lower, upper)?;
    if filtered.height() == 0 {
        return Err(VisualizerError::EmptyTable {
            what: "correlations",
        });
    }
    let correlation = correlation_matrix(&filtered)?;
    let mask = upper_triangle_mask(correlation.len());
    let n = correlation.len();

    let span = (0..n)
        .flat_map(|i| (0..i).map(move |j| (i, j)))
        .map(|(i, j)| correlation.values[i][j].abs())
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    let span = if span > 0.0 { span } else { 1.0 };

    render::prepare_output(path)?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| VisualizerError::render(path, e))?;
    let (matrix_area, bar_area) = root.split_horizontally(size.1.min(size.0) as i32);

    let mut chart = ChartBuilder::on(&matrix_area)
        .caption("Correlation", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(110)
        .y_label_area_size(110)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), -0.5f64..(n as f64 - 0.5))
        .map_err(|e| VisualizerError::render(path, e))?;

    let top = n as f64 - 1.0;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n + 1)
        .y_labels(n + 1)
        .x_label_formatter(&|x| render::index_label(&correlation.labels, *x))
        .y_label_formatter(&|y| render::index_label(&correlation.labels, top - *y))
        .x_label_style(render::vertical_label_style())
        .y_label_style(LABEL_FONT)
        .draw()
        .map_err(|e| VisualizerError::render(path, e))?;

    let visible: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .filter(|&(i, j)| !mask[i][j])
        .collect();

    chart
        .draw_series(visible.iter().map(|&(i, j)| {
            let (x, y) = (j as f64, top - i as f64);
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                render::diverging_color(correlation.values[i][j], span).filled(),
            )
        }))
        .map_err(|e| VisualizerError::render(path, e))?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    chart
        .draw_series(visible.iter().map(|&(i, j)| {
            let value = correlation.values[i][j];
            let style = TextStyle::from(("sans-serif", 13).into_font()).pos(centered);
            let style = if value.abs() / span > 0.6 {
                style.color(&WHITE)
            } else {
                style.color(&BLACK)
            };
            Text::new(format!("{:.1}", value), (j as f64, top - i as f64), style)
        }))
        .map_err(|e| VisualizerError::render(path, e))?;

    draw_color_bar(&bar_area, path, size.1, span)?;

    root.present().map_err(|e| VisualizerError::render(path, e))?;
    info!(
        "wrote {n}x{n} heat map from {} rows to {}",
        filtered.height(),
        path.display()
    );

    Ok(HeatMapFigure {
        path: path.to_path_buf(),
        correlation,
        mask,
        thresholds,
        rows_used: filtered.height(),
    })
}

/// Vertical color scale at half the figure height.
fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    path: &Path,
    height: u32,
    span: f64,
) -> Result<()> {
    let steps = 100;
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .margin_top((height / 4) as i32)
        .margin_bottom((height / 4) as i32)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, -span..span)
        .map_err(|e| VisualizerError::render(path, e))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v| format!("{:.1}", v))
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| VisualizerError::render(path, e))?;

    let step = 2.0 * span / steps as f64;
    chart
        .draw_series((0..steps).map(|k| {
            let low = -span + k as f64 * step;
            Rectangle::new(
                [(0.0, low), (1.0, low + step)],
                render::diverging_color(low + step / 2.0, span).filled(),
            )
        }))
        .map_err(|e| VisualizerError::render(path, e))?;
    Ok(())
}
