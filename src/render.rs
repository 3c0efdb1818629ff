use std::fs;
use std::path::Path;

use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontTransform, IntoFont, RGBColor, TextStyle};

use crate::error::{Result, VisualizerError};

/// Bar colors for indicator value 0 and 1.
pub const VALUE_COLORS: [RGBColor; 2] = [RGBColor(31, 119, 180), RGBColor(255, 127, 14)];

const NEGATIVE: RGBColor = RGBColor(33, 102, 172);
const NEUTRAL: RGBColor = RGBColor(247, 247, 247);
const POSITIVE: RGBColor = RGBColor(178, 24, 43);

pub const CAPTION_FONT: (&str, u32) = ("sans-serif", 22);
pub const LABEL_FONT: (&str, u32) = ("sans-serif", 14);

/// Color of `value` on a diverging scale centered at 0 that saturates at
/// `-span` and `span`.
pub fn diverging_color(value: f64, span: f64) -> RGBColor {
    if !value.is_finite() || span <= 0.0 {
        return NEUTRAL;
    }
    let t = (value / span).clamp(-1.0, 1.0);
    let target = if t < 0.0 { NEGATIVE } else { POSITIVE };
    let t = t.abs();
    let mix = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    RGBColor(
        mix(NEUTRAL.0, target.0),
        mix(NEUTRAL.1, target.1),
        mix(NEUTRAL.2, target.2),
    )
}

/// Name shown under an axis key point placed on an integer index, blank for
/// any other key point.
pub fn index_label(names: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}

/// Whole-number tick label for a count axis.
pub fn count_label(value: f64) -> String {
    format!("{:.0}", value)
}

/// Axis label text turned to run downwards from its tick, so long names hang
/// below the axis instead of straddling it.
pub fn vertical_label_style() -> TextStyle<'static> {
    TextStyle::from(LABEL_FONT.into_font().transform(FontTransform::Rotate90))
        .pos(Pos::new(HPos::Left, VPos::Center))
}

/// Creates the directory an image is written into.
pub fn prepare_output(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| VisualizerError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_the_neutral_color() {
        assert_eq!(diverging_color(0.0, 1.0), NEUTRAL);
        assert_eq!(diverging_color(f64::NAN, 1.0), NEUTRAL);
    }

    #[test]
    fn extremes_saturate() {
        assert_eq!(diverging_color(-1.0, 0.5), NEGATIVE);
        assert_eq!(diverging_color(0.9, 0.5), POSITIVE);
    }

    #[test]
    fn count_ticks_are_whole_numbers() {
        assert_eq!(count_label(200.0), "200");
        assert_eq!(count_label(0.0), "0");
        assert_eq!(count_label(1249.6), "1250");
    }

    #[test]
    fn vertical_labels_start_at_the_tick() {
        let style = vertical_label_style();
        assert!(matches!(style.pos.h_pos, HPos::Left));
        assert!(matches!(style.pos.v_pos, VPos::Center));
    }

    #[test]
    fn labels_only_on_integer_positions() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(index_label(&names, 1.0), "b");
        assert_eq!(index_label(&names, 0.5), "");
        assert_eq!(index_label(&names, 2.0), "");
        assert_eq!(index_label(&names, -1.0), "");
    }
}
