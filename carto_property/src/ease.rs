// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing for transitions.

/// Cubic ease-in-out.
///
/// Saturates outside `[0, 1]`, so degenerate transition windows never
/// produce a factor outside that range.
///
/// ```rust
/// use carto_property::ease_cubic_in_out;
///
/// assert_eq!(ease_cubic_in_out(-1.0), 0.0);
/// assert_eq!(ease_cubic_in_out(0.5), 0.5);
/// assert_eq!(ease_cubic_in_out(2.0), 1.0);
/// ```
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let t2 = t * t;
    let t3 = t2 * t;
    4.0 * if t < 0.5 {
        t3
    } else {
        3.0 * (t - t2) + t3 - 0.75
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_about_midpoint() {
        for i in 0..=50 {
            let t = f64::from(i) / 100.0;
            let sum = ease_cubic_in_out(t) + ease_cubic_in_out(1.0 - t);
            assert!((sum - 1.0).abs() < 1e-12, "t = {t}");
        }
    }

    #[test]
    fn monotonic() {
        let mut last = 0.0;
        for i in 0..=100 {
            let e = ease_cubic_in_out(f64::from(i) / 100.0);
            assert!(e >= last, "ease must not decrease");
            last = e;
        }
    }

    #[test]
    fn saturates_at_infinity() {
        assert_eq!(ease_cubic_in_out(f64::INFINITY), 1.0);
        assert_eq!(ease_cubic_in_out(f64::NEG_INFINITY), 0.0);
    }
}
