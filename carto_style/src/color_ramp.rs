// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ramp textures for `heatmap-color` and `line-gradient`.

use carto_spec::color::to_rgba8;
use carto_spec::{FeatureContext, GlobalState, Globals, StylePropertyExpression};

/// The input a ramp expression is sampled over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RampInput {
    /// `["heatmap-density"]`, for heatmap layers.
    HeatmapDensity,
    /// `["line-progress"]`, for line gradients.
    LineProgress,
}

/// A one-pixel-high RGBA8 texture with straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorRamp {
    /// Pixels across.
    pub width: usize,
    /// Always 1.
    pub height: usize,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl ColorRamp {
    /// The RGBA bytes of pixel `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn pixel(&self, i: usize) -> [u8; 4] {
        let start = i * 4;
        [
            self.data[start],
            self.data[start + 1],
            self.data[start + 2],
            self.data[start + 3],
        ]
    }
}

/// Samples `expression` at `resolution` evenly spaced inputs from 0 to 1.
///
/// Samples that do not produce a color are transparent black.
///
/// ```rust
/// use carto_spec::{ExpressionParameters, PropertySpecification, PropertyType, StylePropertyExpression};
/// use carto_style::{RampInput, render_color_ramp};
/// use serde_json::json;
///
/// let spec = PropertySpecification::builder("line-gradient", PropertyType::Color)
///     .parameters(ExpressionParameters::LINE_PROGRESS)
///     .build();
/// let gradient = json!(["interpolate", ["linear"], ["line-progress"], 0, "blue", 1, "red"]);
/// let expression = StylePropertyExpression::normalize(Some(&gradient), &spec).unwrap();
///
/// let ramp = render_color_ramp(&expression, RampInput::LineProgress, 256);
/// assert_eq!(ramp.width, 256);
/// assert_eq!(ramp.pixel(0), [0, 0, 255, 255]);
/// assert_eq!(ramp.pixel(255), [255, 0, 0, 255]);
/// ```
#[must_use]
pub fn render_color_ramp(
    expression: &StylePropertyExpression,
    input: RampInput,
    resolution: usize,
) -> ColorRamp {
    let global_state = GlobalState::new();
    let width = resolution.max(1);
    let last = width.saturating_sub(1).max(1) as f64;
    let mut data = Vec::with_capacity(width * 4);
    for i in 0..width {
        let ratio = i as f64 / last;
        let mut globals = Globals::new(0.0, &global_state);
        match input {
            RampInput::HeatmapDensity => globals.heatmap_density = Some(ratio),
            RampInput::LineProgress => globals.line_progress = Some(ratio),
        }
        let rgba = expression
            .evaluate(&globals, &FeatureContext::EMPTY)
            .as_color()
            .map_or([0; 4], to_rgba8);
        data.extend_from_slice(&rgba);
    }
    ColorRamp {
        width,
        height: 1,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_spec::{ExpressionParameters, PropertySpecification, PropertyType};
    use serde_json::{Value as Json, json};

    fn gradient(json: Json) -> StylePropertyExpression {
        let spec = PropertySpecification::builder("line-gradient", PropertyType::Color)
            .parameters(ExpressionParameters::LINE_PROGRESS)
            .build();
        StylePropertyExpression::normalize(Some(&json), &spec).unwrap()
    }

    fn nearly_equal(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 3)
    }

    #[test]
    fn linear() {
        let expression = gradient(json!([
            "interpolate", ["linear"], ["line-progress"],
            0, "rgba(0,0,255,0)",
            0.25, "white",
            0.5, "rgba(0,255,255,0.5)",
            0.75, "black",
            1, "red"
        ]));
        let ramp = render_color_ramp(&expression, RampInput::LineProgress, 256);
        assert_eq!((ramp.width, ramp.height), (256, 1));
        assert_eq!(ramp.pixel(0)[3], 0);
        assert!(nearly_equal(ramp.pixel(63), [255, 255, 255, 255]));
        assert!(nearly_equal(ramp.pixel(127), [0, 255, 255, 128]));
        assert!(nearly_equal(ramp.pixel(191), [0, 0, 0, 255]));
        assert!(nearly_equal(ramp.pixel(255), [255, 0, 0, 255]));
    }

    #[test]
    fn step() {
        let expression = gradient(json!([
            "step", ["line-progress"],
            "rgba(0, 0, 255, 0.1)",
            0.1, "red",
            0.2, "yellow",
            0.3, "white",
            0.5, "black",
            1, "black"
        ]));
        let ramp = render_color_ramp(&expression, RampInput::LineProgress, 512);
        assert_eq!(ramp.width, 512);
        assert_eq!(ramp.pixel(0)[3], 26);
        assert!(nearly_equal(ramp.pixel(50), [0, 0, 255, 26]));
        assert!(nearly_equal(ramp.pixel(53), [255, 0, 0, 255]));
        assert!(nearly_equal(ramp.pixel(103), [255, 255, 0, 255]));
        assert!(nearly_equal(ramp.pixel(160), [255, 255, 255, 255]));
        assert!(nearly_equal(ramp.pixel(256), [0, 0, 0, 255]));
    }

    #[test]
    fn heatmap_density_input() {
        let spec = PropertySpecification::builder("heatmap-color", PropertyType::Color)
            .parameters(ExpressionParameters::HEATMAP_DENSITY)
            .build();
        let json = json!(["interpolate", ["linear"], ["heatmap-density"], 0, "black", 1, "white"]);
        let expression = StylePropertyExpression::normalize(Some(&json), &spec).unwrap();
        let ramp = render_color_ramp(&expression, RampInput::HeatmapDensity, 3);
        assert_eq!(ramp.pixel(0), [0, 0, 0, 255]);
        assert_eq!(ramp.pixel(2), [255, 255, 255, 255]);
    }
}
