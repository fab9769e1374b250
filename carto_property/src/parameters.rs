// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-global evaluation inputs.

use carto_spec::{GlobalState, Globals};
use serde::{Deserialize, Serialize};

/// Tracks the camera's recent integer-zoom crossings.
///
/// Cross-faded properties use this to know which of two pre-rendered
/// representations is "current" and how far the fade between them has
/// progressed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZoomHistory {
    last_zoom: f64,
    last_floor_zoom: f64,
    last_integer_zoom: f64,
    last_integer_zoom_time: f64,
    first: bool,
}

impl Default for ZoomHistory {
    fn default() -> Self {
        Self {
            last_zoom: 0.0,
            last_floor_zoom: 0.0,
            last_integer_zoom: 0.0,
            last_integer_zoom_time: 0.0,
            first: true,
        }
    }
}

impl ZoomHistory {
    /// Creates an unseeded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a seeded history whose last integer-zoom crossing happened
    /// at `zoom` and `time`.
    #[must_use]
    pub fn with_last_integer_zoom(zoom: f64, time: f64) -> Self {
        Self {
            last_zoom: zoom,
            last_floor_zoom: zoom.floor(),
            last_integer_zoom: zoom,
            last_integer_zoom_time: time,
            first: false,
        }
    }

    /// The zoom of the most recent update.
    #[must_use]
    #[inline]
    pub fn last_zoom(&self) -> f64 {
        self.last_zoom
    }

    /// The integer zoom most recently crossed.
    #[must_use]
    #[inline]
    pub fn last_integer_zoom(&self) -> f64 {
        self.last_integer_zoom
    }

    /// When the most recent integer-zoom crossing happened.
    #[must_use]
    #[inline]
    pub fn last_integer_zoom_time(&self) -> f64 {
        self.last_integer_zoom_time
    }

    /// Records the camera at `zoom` at time `now`.
    ///
    /// Returns `true` if the zoom changed. The first update seeds the history
    /// without recording a crossing time.
    pub fn update(&mut self, zoom: f64, now: f64) -> bool {
        let floor = zoom.floor();

        if self.first {
            self.first = false;
            self.last_integer_zoom = floor;
            self.last_integer_zoom_time = 0.0;
            self.last_zoom = zoom;
            self.last_floor_zoom = floor;
            return true;
        }

        if self.last_floor_zoom > floor {
            self.last_integer_zoom = floor + 1.0;
            self.last_integer_zoom_time = now;
        } else if self.last_floor_zoom < floor {
            self.last_integer_zoom = floor;
            self.last_integer_zoom_time = now;
        }

        if zoom != self.last_zoom {
            self.last_zoom = zoom;
            self.last_floor_zoom = floor;
            return true;
        }
        false
    }
}

/// Transition timing in milliseconds.
///
/// Absent fields fall back to the frame defaults, field by field.
///
/// ```rust
/// use carto_property::TransitionSpecification;
///
/// let explicit: TransitionSpecification = serde_json::from_str(r#"{"duration": 3000}"#).unwrap();
/// let merged = explicit.or(TransitionSpecification::DEFAULT);
/// assert_eq!(merged.duration, Some(3000.0));
/// assert_eq!(merged.delay, Some(0.0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionSpecification {
    /// How long the transition runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// How long to wait before starting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
}

impl TransitionSpecification {
    /// The style-wide default: 300ms, no delay.
    pub const DEFAULT: Self = Self {
        duration: Some(300.0),
        delay: Some(0.0),
    };

    /// Creates a fully specified timing.
    #[must_use]
    pub const fn new(duration: f64, delay: f64) -> Self {
        Self {
            duration: Some(duration),
            delay: Some(delay),
        }
    }

    /// Fills absent fields from `defaults`.
    #[must_use]
    pub fn or(self, defaults: Self) -> Self {
        Self {
            duration: self.duration.or(defaults.duration),
            delay: self.delay.or(defaults.delay),
        }
    }

    /// Duration, treating absence as zero.
    #[must_use]
    #[inline]
    pub fn duration_or_zero(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// Delay, treating absence as zero.
    #[must_use]
    #[inline]
    pub fn delay_or_zero(&self) -> f64 {
        self.delay.unwrap_or(0.0)
    }
}

/// Inputs to [`Transitionable::transitioned`](crate::Transitionable::transitioned).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransitionParameters {
    /// The instant new transitions start from, in milliseconds.
    pub now: f64,
    /// Timing for properties without an explicit transition.
    pub transition: TransitionSpecification,
}

impl TransitionParameters {
    /// Creates parameters at `now` with the default timing.
    #[must_use]
    pub fn new(now: f64) -> Self {
        Self {
            now,
            transition: TransitionSpecification::DEFAULT,
        }
    }

    /// Replaces the default timing.
    #[must_use]
    pub fn with_transition(mut self, transition: TransitionSpecification) -> Self {
        self.transition = transition;
        self
    }
}

/// Interpolation inputs for image-backed properties drawn at two scales.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CrossfadeParameters {
    /// Scale of the outgoing representation.
    pub from_scale: f64,
    /// Scale of the incoming representation.
    pub to_scale: f64,
    /// Blend weight of the incoming representation.
    pub t: f64,
}

/// A frozen snapshot of the frame-global inputs to evaluation.
///
/// Every possibly-evaluated value keeps a copy of the parameters that
/// produced it, so per-feature evaluation later in the frame sees the same
/// zoom and global state as the rest of the frame.
///
/// ```rust
/// use carto_property::{EvaluationParameters, ZoomHistory};
///
/// let params = EvaluationParameters::new(3.5)
///     .with_now(250.0)
///     .with_fade_duration(500.0)
///     .with_zoom_history(ZoomHistory::with_last_integer_zoom(3.0, 0.0));
///
/// assert_eq!(params.cross_fading_factor(), 0.5);
/// let crossfade = params.crossfade_parameters();
/// assert_eq!(crossfade.from_scale, 2.0);
/// assert_eq!(crossfade.t, 0.75);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationParameters {
    /// Camera zoom.
    pub zoom: f64,
    /// Wall-clock time in milliseconds.
    pub now: f64,
    /// Duration of the cross-fade between integer zooms, in milliseconds.
    pub fade_duration: f64,
    /// Recent integer-zoom crossings.
    pub zoom_history: ZoomHistory,
    /// Default transition timing.
    pub transition: TransitionSpecification,
    /// Shared values read by `["global-state", key]` expressions.
    pub global_state: GlobalState,
}

impl Default for EvaluationParameters {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl EvaluationParameters {
    /// Creates parameters at `zoom` and time zero, with no fade and the
    /// default transition timing.
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            now: 0.0,
            fade_duration: 0.0,
            zoom_history: ZoomHistory::default(),
            transition: TransitionSpecification::DEFAULT,
            global_state: GlobalState::default(),
        }
    }

    /// Sets the current time.
    #[must_use]
    pub fn with_now(mut self, now: f64) -> Self {
        self.now = now;
        self
    }

    /// Sets the cross-fade duration.
    #[must_use]
    pub fn with_fade_duration(mut self, fade_duration: f64) -> Self {
        self.fade_duration = fade_duration;
        self
    }

    /// Sets the zoom history.
    #[must_use]
    pub fn with_zoom_history(mut self, zoom_history: ZoomHistory) -> Self {
        self.zoom_history = zoom_history;
        self
    }

    /// Sets the default transition timing.
    #[must_use]
    pub fn with_transition(mut self, transition: TransitionSpecification) -> Self {
        self.transition = transition;
        self
    }

    /// Sets the global state snapshot.
    #[must_use]
    pub fn with_global_state(mut self, global_state: GlobalState) -> Self {
        self.global_state = global_state;
        self
    }

    /// A copy of these parameters at a different zoom.
    #[must_use]
    pub fn at_zoom(&self, zoom: f64) -> Self {
        Self {
            zoom,
            ..self.clone()
        }
    }

    /// Expression globals for these parameters.
    #[must_use]
    pub fn globals(&self) -> Globals<'_> {
        Globals::new(self.zoom, &self.global_state)
    }

    /// Progress of the cross-fade that started at the last integer-zoom
    /// crossing, in `[0, 1]`.
    #[must_use]
    pub fn cross_fading_factor(&self) -> f64 {
        if self.fade_duration == 0.0 {
            1.0
        } else {
            ((self.now - self.zoom_history.last_integer_zoom_time()) / self.fade_duration).min(1.0)
        }
    }

    /// Scales and blend weight for drawing image-backed properties.
    #[must_use]
    pub fn crossfade_parameters(&self) -> CrossfadeParameters {
        let z = self.zoom;
        let fraction = z - z.floor();
        let t = self.cross_fading_factor();
        if z > self.zoom_history.last_integer_zoom() {
            CrossfadeParameters {
                from_scale: 2.0,
                to_scale: 1.0,
                t: fraction + (1.0 - fraction) * t,
            }
        } else {
            CrossfadeParameters {
                from_scale: 0.5,
                to_scale: 1.0,
                t: 1.0 - (1.0 - t) * fraction,
            }
        }
    }
}

/// Options for property setters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetterOptions {
    /// Type-check literal input against the property before storing it.
    pub validate: bool,
}

impl Default for SetterOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}
