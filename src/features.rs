use log::info;
use polars::prelude::*;

use crate::error::Result;
use crate::records::OVERWEIGHT;

/// BMI above which an examination counts as overweight. Exactly 25 does not.
pub const OVERWEIGHT_BMI: f64 = 25.0;

/// Adds `overweight` and rewrites `cholesterol` and `gluc` so that 0 is always
/// good and 1 always bad.
///
/// Expects `height > 0`; a zero height gives an infinite BMI.
pub fn derive_features(df: &DataFrame) -> Result<DataFrame> {
    let height_m = col("height").cast(DataType::Float64) / lit(100.0);
    let bmi = col("weight").cast(DataType::Float64) / (height_m.clone() * height_m);

    let derived = df
        .clone()
        .lazy()
        .with_columns([
            bmi.gt(lit(OVERWEIGHT_BMI))
                .cast(DataType::Int64)
                .alias(OVERWEIGHT),
            binarize("cholesterol"),
            binarize("gluc"),
        ])
        .collect()?;

    let overweight = derived.column(OVERWEIGHT)?.i64()?.into_iter().flatten().sum::<i64>();
    info!(
        "derived features for {} examinations, {} overweight",
        derived.height(),
        overweight
    );
    Ok(derived)
}

fn binarize(name: &str) -> Expr {
    col(name).gt(lit(1)).cast(DataType::Int64).alias(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(height: &[i64], weight: &[f64], cholesterol: &[i64], gluc: &[i64]) -> DataFrame {
        df!(
            "height" => height,
            "weight" => weight,
            "cholesterol" => cholesterol,
            "gluc" => gluc
        )
        .unwrap()
    }

    fn ints(df: &DataFrame, name: &str) -> Vec<i64> {
        df.column(name)
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn single_row_example() {
        let df = frame(&[170], &[80.0], &[2], &[1]);
        let derived = derive_features(&df).unwrap();
        assert_eq!(ints(&derived, OVERWEIGHT), vec![1]);
        assert_eq!(ints(&derived, "cholesterol"), vec![1]);
        assert_eq!(ints(&derived, "gluc"), vec![0]);
    }

    #[test]
    fn bmi_of_exactly_25_is_not_overweight() {
        // 100 / 2.0^2 == 25.0 exactly, 100.5 / 2.0^2 is just over
        let df = frame(&[200, 200, 200], &[100.0, 100.5, 60.0], &[1, 1, 1], &[1, 1, 1]);
        let derived = derive_features(&df).unwrap();
        assert_eq!(ints(&derived, OVERWEIGHT), vec![0, 1, 0]);
    }

    #[test]
    fn ordinal_levels_collapse_to_flags() {
        let df = frame(&[160, 160, 160], &[50.0, 50.0, 50.0], &[1, 2, 3], &[3, 1, 2]);
        let derived = derive_features(&df).unwrap();
        assert_eq!(ints(&derived, "cholesterol"), vec![0, 1, 1]);
        assert_eq!(ints(&derived, "gluc"), vec![1, 0, 1]);
    }

    #[test]
    fn input_frame_is_left_untouched() {
        let df = frame(&[170], &[80.0], &[3], &[2]);
        let _ = derive_features(&df).unwrap();
        assert_eq!(ints(&df, "cholesterol"), vec![3]);
        assert!(df.column(OVERWEIGHT).is_err());
    }
}
