use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VisualizerError};

static DEFAULT_INPUT: &str = "medical_examination.csv";
static CAT_PLOT_FILE_NAME: &str = "catplot.png";
static HEAT_MAP_FILE_NAME: &str = "heatmap.png";

/// Settings for one visualizer run. Every field has a default, so a JSON
/// config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub cat_plot_file: String,
    pub heat_map_file: String,
    /// Lower bound of the height/weight quantile filter, linear interpolation.
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    pub cat_plot_size: (u32, u32),
    pub heat_map_size: (u32, u32),
    /// Also write the plotted data as CSV next to each image.
    pub export_data: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        VisualizerConfig {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            cat_plot_file: CAT_PLOT_FILE_NAME.to_string(),
            heat_map_file: HEAT_MAP_FILE_NAME.to_string(),
            lower_quantile: 0.025,
            upper_quantile: 0.975,
            cat_plot_size: (1200, 600),
            heat_map_size: (1000, 800),
            export_data: false,
        }
    }
}

impl VisualizerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| VisualizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: VisualizerConfig =
            serde_json::from_str(&raw).map_err(|e| VisualizerError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (lower, upper) = (self.lower_quantile, self.upper_quantile);
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(VisualizerError::QuantileRange { lower, upper });
        }
        Ok(())
    }

    pub fn cat_plot_path(&self) -> PathBuf {
        self.output_dir.join(&self.cat_plot_file)
    }

    pub fn heat_map_path(&self) -> PathBuf {
        self.output_dir.join(&self.heat_map_file)
    }

    /// Builds the effective config: file (if any), then command line overrides.
    pub fn from_args(args: &VisualizerArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => VisualizerConfig::from_json_file(path)?,
            None => VisualizerConfig::default(),
        };
        if let Some(input) = &args.input {
            config.input = input.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(lower) = args.lower_quantile {
            config.lower_quantile = lower;
        }
        if let Some(upper) = args.upper_quantile {
            config.upper_quantile = upper;
        }
        config.export_data |= args.export_data;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Draws the categorical plot and heat map of a medical examination dataset", long_about = None)]
pub struct VisualizerArgs {
    #[arg(short, long, help = "Input CSV path [default: medical_examination.csv]")]
    pub input: Option<PathBuf>,
    #[arg(short, long, help = "Directory the images are written to [default: .]")]
    pub output_dir: Option<PathBuf>,
    #[arg(short, long, help = "JSON config file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Lower height/weight quantile kept by the heat map")]
    pub lower_quantile: Option<f64>,
    #[arg(long, help = "Upper height/weight quantile kept by the heat map")]
    pub upper_quantile: Option<f64>,
    #[arg(short, long, help = "Write the plotted data as CSV next to each image")]
    pub export_data: bool,
    #[arg(short, long, help = "Print a JSON run summary on stdout")]
    pub summary: bool,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Verbose level")]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_usual_files() {
        let config = VisualizerConfig::default();
        assert_eq!(config.input, PathBuf::from("medical_examination.csv"));
        assert_eq!(config.cat_plot_path(), PathBuf::from("./catplot.png"));
        assert_eq!(config.heat_map_path(), PathBuf::from("./heatmap.png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: VisualizerConfig =
            serde_json::from_str(r#"{"output_dir": "out", "export_data": true}"#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.export_data);
        assert_eq!(config.lower_quantile, 0.025);
        assert_eq!(config.heat_map_file, "heatmap.png");
    }

    #[test]
    fn rejects_inverted_quantiles() {
        let config = VisualizerConfig {
            lower_quantile: 0.9,
            upper_quantile: 0.1,
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VisualizerError::QuantileRange { .. })
        ));
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = VisualizerArgs::parse_from([
            "medviz",
            "--input",
            "data.csv",
            "-o",
            "plots",
            "--upper-quantile",
            "0.99",
            "-e",
            "-vv",
        ]);
        assert_eq!(args.verbose, 2);
        let config = VisualizerConfig::from_args(&args).unwrap();
        assert_eq!(config.input, PathBuf::from("data.csv"));
        assert_eq!(config.cat_plot_path(), PathBuf::from("plots/catplot.png"));
        assert_eq!(config.upper_quantile, 0.99);
        assert!(config.export_data);
    }
}
