// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color parsing and conversion helpers.
//!
//! Colors are [`peniko::Color`] values in the sRGB color space with
//! straight (non-premultiplied) alpha.

use peniko::color::{Srgb, parse_color as parse_css_color};

pub use peniko::Color;

/// Parses a CSS color string such as `"red"`, `"#ff0000"` or `"rgba(255, 0, 0, 1)"`.
///
/// Returns `None` if the string is not a recognized color.
///
/// ```rust
/// use carto_spec::color::parse_color;
///
/// let red = parse_color("red").unwrap();
/// assert_eq!(red.components, [1.0, 0.0, 0.0, 1.0]);
/// assert!(parse_color("notacolor").is_none());
/// ```
#[must_use]
pub fn parse_color(input: &str) -> Option<Color> {
    parse_css_color(input)
        .ok()
        .map(|color| color.to_alpha_color::<Srgb>())
}

/// Formats a color as a CSS `rgba(...)` string.
#[must_use]
pub fn color_to_css(color: Color) -> String {
    let [r, g, b, a] = to_rgba8(color);
    format!("rgba({r},{g},{b},{})", f64::from(a) / 255.0)
}

/// Converts a color to 8-bit RGBA, rounding each channel.
#[must_use]
pub fn to_rgba8(color: Color) -> [u8; 4] {
    let [r, g, b, a] = color.components;
    [channel(r), channel(g), channel(b), channel(a)]
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to 0..=255 first"
)]
fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_hex_colors() {
        assert_eq!(parse_color("white").unwrap().components, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(
            parse_color("#00ff00").unwrap().components,
            [0.0, 1.0, 0.0, 1.0]
        );
        assert!(parse_color("").is_none());
    }

    #[test]
    fn rgba8_round_trip() {
        let color = Color::new([1.0, 0.5, 0.0, 1.0]);
        assert_eq!(to_rgba8(color), [255, 128, 0, 255]);
        assert_eq!(color_to_css(color), "rgba(255,128,0,1)");
    }
}
