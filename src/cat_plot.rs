use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::prelude::*;
use polars::prelude::*;

use crate::error::{Result, VisualizerError};
use crate::records::{CARDIO, INDICATOR_COLUMNS};
use crate::render::{self, CAPTION_FONT, LABEL_FONT, VALUE_COLORS};

/// Number of `(cardio, variable, value)` occurrences in the melted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub cardio: i64,
    pub variable: String,
    pub value: i64,
    pub total: u64,
}

/// What `draw_cat_plot` drew and where it went.
#[derive(Debug, Clone)]
pub struct CatPlotFigure {
    pub path: PathBuf,
    /// Distinct `cardio` values, one panel each, left to right.
    pub panels: Vec<i64>,
    /// Sorted by cardio, then variable in plotting order, then value.
    pub counts: Vec<CategoryCount>,
}

impl CatPlotFigure {
    pub fn total(&self, cardio: i64, variable: &str, value: i64) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.cardio == cardio && c.variable == variable && c.value == value)
            .map(|c| c.total)
    }

    pub fn panel_total(&self, cardio: i64) -> u64 {
        self.counts
            .iter()
            .filter(|c| c.cardio == cardio)
            .map(|c| c.total)
            .sum()
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            CARDIO => self.counts.iter().map(|c| c.cardio).collect::<Vec<_>>(),
            "variable" => self.counts.iter().map(|c| c.variable.clone()).collect::<Vec<_>>(),
            "value" => self.counts.iter().map(|c| c.value).collect::<Vec<_>>(),
            "total" => self.counts.iter().map(|c| c.total).collect::<Vec<_>>()
        )?;
        Ok(df)
    }
}

fn variable_rank(variable: &str) -> usize {
    INDICATOR_COLUMNS
        .iter()
        .position(|name| *name == variable)
        .unwrap_or(INDICATOR_COLUMNS.len())
}

/// Melts the indicator columns against `cardio` and counts each
/// `(cardio, variable, value)` combination.
pub fn category_counts(df: &DataFrame) -> Result<Vec<CategoryCount>> {
    let long = df.melt([CARDIO], INDICATOR_COLUMNS)?;
    debug!("melted {} rows into {}", df.height(), long.height());

    let grouped = long
        .lazy()
        .groupby([col(CARDIO), col("variable"), col("value")])
        .agg([count().alias("total")])
        .collect()?;

    let cardio = grouped.column(CARDIO)?.i64()?;
    let variable = grouped.column("variable")?.utf8()?;
    let value = grouped.column("value")?.cast(&DataType::Int64)?;
    let value = value.i64()?;
    let total = grouped.column("total")?.cast(&DataType::UInt64)?;
    let total = total.u64()?;

    let mut counts: Vec<CategoryCount> = cardio
        .into_iter()
        .zip(variable.into_iter())
        .zip(value.into_iter())
        .zip(total.into_iter())
        .filter_map(|(((cardio, variable), value), total)| {
            Some(CategoryCount {
                cardio: cardio?,
                variable: variable?.to_string(),
                value: value?,
                total: total?,
            })
        })
        .collect();

    counts.sort_by(|a, b| {
        (a.cardio, variable_rank(&a.variable), a.value).cmp(&(
            b.cardio,
            variable_rank(&b.variable),
            b.value,
        ))
    });
    Ok(counts)
}

/// Draws the grouped bar chart of indicator counts, one panel per `cardio`
/// value, and writes it to `path`.
pub fn draw_cat_plot(df: &DataFrame, path: &Path, size: (u32, u32)) -> Result<CatPlotFigure> {
    let counts = category_counts(df)?;
    let mut panels: Vec<i64> = counts.iter().map(|c| c.cardio).collect();
    panels.dedup();
    if panels.is_empty() {
        return Err(VisualizerError::EmptyTable {
            what: "category counts",
        });
    }

    render::prepare_output(path)?;
    let names: Vec<String> = INDICATOR_COLUMNS.iter().map(|s| s.to_string()).collect();
    let y_max = counts.iter().map(|c| c.total).max().unwrap_or(1) as f64 * 1.1;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| VisualizerError::render(path, e))?;

    for (area, cardio) in root.split_evenly((1, panels.len())).iter().zip(&panels) {
        let mut chart = ChartBuilder::on(area)
            .caption(format!("{CARDIO} = {cardio}"), CAPTION_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(names.len() as f64 - 0.5), 0f64..y_max)
            .map_err(|e| VisualizerError::render(path, e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len() + 1)
            .x_label_formatter(&|x| render::index_label(&names, *x))
            .y_label_formatter(&|y| render::count_label(*y))
            .x_desc("variable")
            .y_desc("total")
            .label_style(LABEL_FONT)
            .draw()
            .map_err(|e| VisualizerError::render(path, e))?;

        for (value, color) in VALUE_COLORS.into_iter().enumerate() {
            let value = value as i64;
            let bars = counts
                .iter()
                .filter(|c| c.cardio == *cardio && c.value == value)
                .map(|c| {
                    let left = variable_rank(&c.variable) as f64 - 0.4 + 0.4 * value as f64;
                    Rectangle::new([(left, 0.0), (left + 0.4, c.total as f64)], color.filled())
                });
            chart
                .draw_series(bars)
                .map_err(|e| VisualizerError::render(path, e))?
                .label(value.to_string())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(LABEL_FONT)
            .draw()
            .map_err(|e| VisualizerError::render(path, e))?;
    }

    root.present().map_err(|e| VisualizerError::render(path, e))?;
    info!("wrote categorical plot with {} panels to {}", panels.len(), path.display());

    Ok(CatPlotFigure {
        path: path.to_path_buf(),
        panels,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived_frame() -> DataFrame {
        df!(
            "cholesterol" => [0i64, 1, 0, 1, 1],
            "gluc" => [0i64, 0, 0, 1, 0],
            "smoke" => [0i64, 0, 1, 0, 0],
            "alco" => [0i64, 0, 0, 0, 1],
            "active" => [1i64, 1, 0, 1, 1],
            "overweight" => [0i64, 1, 1, 1, 0],
            "cardio" => [0i64, 0, 1, 1, 1]
        )
        .unwrap()
    }

    #[test]
    fn each_row_contributes_six_counts() {
        let counts = category_counts(&derived_frame()).unwrap();
        let per_cardio = |cardio: i64| -> u64 {
            counts
                .iter()
                .filter(|c| c.cardio == cardio)
                .map(|c| c.total)
                .sum()
        };
        assert_eq!(per_cardio(0), 2 * 6);
        assert_eq!(per_cardio(1), 3 * 6);
    }

    #[test]
    fn counts_follow_plotting_order() {
        let counts = category_counts(&derived_frame()).unwrap();
        let first_panel: Vec<(&str, i64)> = counts
            .iter()
            .filter(|c| c.cardio == 0)
            .map(|c| (c.variable.as_str(), c.value))
            .collect();
        assert_eq!(
            first_panel,
            vec![
                ("cholesterol", 0),
                ("cholesterol", 1),
                ("gluc", 0),
                ("smoke", 0),
                ("alco", 0),
                ("active", 1),
                ("overweight", 0),
                ("overweight", 1),
            ]
        );
    }

    #[test]
    fn specific_totals() {
        let counts = category_counts(&derived_frame()).unwrap();
        let figure = CatPlotFigure {
            path: PathBuf::new(),
            panels: vec![0, 1],
            counts,
        };
        assert_eq!(figure.total(1, "cholesterol", 1), Some(2));
        assert_eq!(figure.total(1, "overweight", 1), Some(2));
        assert_eq!(figure.total(0, "smoke", 1), None);
        assert_eq!(figure.panel_total(1), 18);
        assert_eq!(figure.to_frame().unwrap().height(), figure.counts.len());
    }
}
