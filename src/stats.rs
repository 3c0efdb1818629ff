//! Descriptive statistics on frame columns.

use polars::prelude::*;

use crate::error::{Result, VisualizerError};

/// Inclusive `[lower, upper]` quantile bounds of a numeric column, linearly
/// interpolated between order statistics.
pub fn quantile_bounds(df: &DataFrame, name: &str, lower: f64, upper: f64) -> Result<(f64, f64)> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    let values = values.f64()?;
    let low = values.quantile(lower, QuantileInterpolOptions::Linear)?;
    let high = values.quantile(upper, QuantileInterpolOptions::Linear)?;
    match (low, high) {
        (Some(low), Some(high)) => Ok((low, high)),
        _ => Err(VisualizerError::EmptyTable { what: "quantiles" }),
    }
}

/// Pearson correlation coefficient of two equally long columns over the rows
/// where both are present. NaN when either column is constant there or no
/// row is complete.
pub fn pearson(a: &Float64Chunked, b: &Float64Chunked) -> Result<f64> {
    let complete = a.is_not_null() & b.is_not_null();
    let a = a.filter(&complete)?;
    let b = b.filter(&complete)?;
    let (mean_a, mean_b) = match (a.mean(), b.mean()) {
        (Some(mean_a), Some(mean_b)) => (mean_a, mean_b),
        _ => return Ok(f64::NAN),
    };
    let da = &a - mean_a;
    let db = &b - mean_b;

    let cov = (&da * &db).sum().unwrap_or(0.0);
    let var_a = (&da * &da).sum().unwrap_or(0.0);
    let var_b = (&db * &db).sum().unwrap_or(0.0);

    Ok((cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunked(values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice("v", values)
    }

    #[test]
    fn linear_quantiles_match_numpy() {
        // numpy.quantile([1..=10], [0.025, 0.975]) == [1.225, 9.775]
        let df = df!("x" => (1..=10).collect::<Vec<i64>>()).unwrap();
        let (low, high) = quantile_bounds(&df, "x", 0.025, 0.975).unwrap();
        assert!((low - 1.225).abs() < 1e-9, "{low}");
        assert!((high - 9.775).abs() < 1e-9, "{high}");
    }

    #[test]
    fn quantiles_of_empty_column_fail() {
        let df = df!("x" => Vec::<f64>::new()).unwrap();
        assert!(matches!(
            quantile_bounds(&df, "x", 0.025, 0.975),
            Err(VisualizerError::EmptyTable { .. })
        ));
    }

    #[test]
    fn perfectly_linear_columns() {
        let a = chunked(&[1.0, 2.0, 3.0, 4.0]);
        let b = chunked(&[10.0, 20.0, 30.0, 40.0]);
        let c = chunked(&[4.0, 3.0, 2.0, 1.0]);
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_coefficient() {
        // scipy.stats.pearsonr([1, 2, 3, 4, 5], [2, 4, 5, 4, 5])[0]
        let a = chunked(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = chunked(&[2.0, 4.0, 5.0, 4.0, 5.0]);
        assert!((pearson(&a, &b).unwrap() - 0.774_596_669).abs() < 1e-6);
    }

    #[test]
    fn rows_with_a_null_are_skipped_pairwise() {
        let a = chunked(&[1.0, 2.0, 3.0, 100.0]);
        let b = Float64Chunked::from_slice_options("b", &[Some(1.0), Some(2.0), Some(3.0), None]);
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&b, &a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_complete_rows_is_nan() {
        let a = Float64Chunked::from_slice_options("a", &[Some(1.0), None]);
        let b = Float64Chunked::from_slice_options("b", &[None, Some(2.0)]);
        assert!(pearson(&a, &b).unwrap().is_nan());
    }

    #[test]
    fn constant_column_is_nan() {
        let a = chunked(&[1.0, 1.0, 1.0]);
        let b = chunked(&[1.0, 2.0, 3.0]);
        assert!(pearson(&a, &b).unwrap().is_nan());
    }
}
