// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal expression tree for style property values.
//!
//! This covers the operators a property engine needs to exercise every
//! evaluation class: literals, feature lookups, feature state, global state,
//! zoom curves, and formatted text. Expressions are parsed from their JSON
//! array form, e.g. `["interpolate", ["linear"], ["zoom"], 0, 1, 10, 2]`.

use serde_json::Value as Json;

use crate::color::parse_color;
use crate::error::ExpressionError;
use crate::global_state::GlobalState;
use crate::interpolate;
use crate::value::{Feature, FeatureState, Formatted, FormattedSection, Value};

/// The evaluation class of an expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// Depends on neither zoom nor feature data.
    Constant,
    /// Depends on zoom only.
    Camera,
    /// Depends on feature data only.
    Source,
    /// Depends on both zoom and feature data.
    Composite,
}

impl ExpressionKind {
    /// Derives the class from an expression's dependencies.
    #[must_use]
    pub fn from_dependencies(zoom_constant: bool, feature_constant: bool) -> Self {
        match (zoom_constant, feature_constant) {
            (true, true) => Self::Constant,
            (false, true) => Self::Camera,
            (true, false) => Self::Source,
            (false, false) => Self::Composite,
        }
    }

    /// Returns `true` for [`Source`](Self::Source) and [`Composite`](Self::Composite).
    #[must_use]
    #[inline]
    pub fn is_data_driven(self) -> bool {
        matches!(self, Self::Source | Self::Composite)
    }
}

/// Frame-global inputs to expression evaluation.
#[derive(Copy, Clone, Debug)]
pub struct Globals<'a> {
    /// The zoom to evaluate at.
    pub zoom: f64,
    /// Input for `["heatmap-density"]`.
    pub heatmap_density: Option<f64>,
    /// Input for `["line-progress"]`.
    pub line_progress: Option<f64>,
    /// Values for `["global-state", key]`.
    pub global_state: &'a GlobalState,
}

impl<'a> Globals<'a> {
    /// Creates globals at `zoom`.
    #[must_use]
    pub fn new(zoom: f64, global_state: &'a GlobalState) -> Self {
        Self {
            zoom,
            heatmap_density: None,
            line_progress: None,
            global_state,
        }
    }

    /// Returns a copy evaluated at a different zoom.
    #[must_use]
    pub fn at_zoom(self, zoom: f64) -> Self {
        Self { zoom, ..self }
    }
}

/// Per-feature inputs to expression evaluation.
#[derive(Copy, Clone, Debug, Default)]
pub struct FeatureContext<'a> {
    /// The feature being evaluated, if any.
    pub feature: Option<&'a Feature>,
    /// The feature's state.
    pub feature_state: Option<&'a FeatureState>,
    /// The rich-text span being evaluated, if any.
    pub formatted_section: Option<&'a FormattedSection>,
}

impl<'a> FeatureContext<'a> {
    /// A context with no feature.
    pub const EMPTY: Self = Self {
        feature: None,
        feature_state: None,
        formatted_section: None,
    };

    /// Creates a context for `feature`.
    #[must_use]
    pub fn new(feature: &'a Feature, feature_state: &'a FeatureState) -> Self {
        Self {
            feature: Some(feature),
            feature_state: Some(feature_state),
            formatted_section: None,
        }
    }

    /// Sets the active rich-text span.
    #[must_use]
    pub fn with_section(mut self, section: &'a FormattedSection) -> Self {
        self.formatted_section = Some(section);
        self
    }
}

/// The curve used by an `interpolate` expression.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Interpolation {
    /// `["linear"]`
    Linear,
    /// `["exponential", base]`
    Exponential(f64),
}

impl Interpolation {
    fn base(self) -> f64 {
        match self {
            Self::Linear => 1.0,
            Self::Exponential(base) => base,
        }
    }
}

/// One section of a `format` expression.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatSection {
    /// The section text.
    pub content: Expr,
    /// `font-scale` option.
    pub scale: Option<Expr>,
    /// `text-font` option.
    pub font_stack: Option<Expr>,
    /// `text-color` option.
    pub text_color: Option<Expr>,
}

impl FormatSection {
    /// Returns `true` if this section overrides the named paint property.
    #[must_use]
    pub fn has_override_for(&self, property: &str) -> bool {
        match property {
            "text-color" => self.text_color.is_some(),
            _ => false,
        }
    }
}

/// A parsed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A constant.
    Literal(Value),
    /// `["get", key]`
    Get(String),
    /// `["has", key]`
    Has(String),
    /// `["feature-state", key]`
    FeatureState(String),
    /// `["global-state", key]`
    GlobalState(String),
    /// `["zoom"]`
    Zoom,
    /// `["heatmap-density"]`
    HeatmapDensity,
    /// `["line-progress"]`
    LineProgress,
    /// `["interpolate", interpolation, input, stop, output, ...]`
    Interpolate {
        /// The curve.
        interpolation: Interpolation,
        /// The numeric input.
        input: Box<Self>,
        /// Ascending stop inputs and their outputs.
        stops: Vec<(f64, Self)>,
    },
    /// `["step", input, default, stop, output, ...]`
    Step {
        /// The numeric input.
        input: Box<Self>,
        /// Output below the first stop.
        default: Box<Self>,
        /// Ascending stop inputs and their outputs.
        stops: Vec<(f64, Self)>,
    },
    /// `["coalesce", ...]`
    Coalesce(Vec<Self>),
    /// `["case", condition, output, ..., fallback]`
    Case {
        /// Condition/output pairs, tested in order.
        branches: Vec<(Self, Self)>,
        /// Output when no condition holds.
        otherwise: Box<Self>,
    },
    /// `["==", a, b]` or `["!=", a, b]`
    Equals {
        /// Left operand.
        lhs: Box<Self>,
        /// Right operand.
        rhs: Box<Self>,
        /// `true` for `!=`.
        negate: bool,
    },
    /// `["to-color", value, ...fallbacks]`
    ToColor(Vec<Self>),
    /// `["format", ...]`
    Format(Vec<FormatSection>),
    /// `["image", name]`
    Image(Box<Self>),
}

const OPERATORS: &[&str] = &[
    "literal",
    "get",
    "has",
    "feature-state",
    "global-state",
    "zoom",
    "heatmap-density",
    "line-progress",
    "interpolate",
    "step",
    "coalesce",
    "case",
    "==",
    "!=",
    "to-color",
    "format",
    "image",
];

impl Expr {
    /// Returns `true` if `json` is an expression rather than a literal: an
    /// array whose first element names a known operator.
    #[must_use]
    pub fn is_expression(json: &Json) -> bool {
        json.as_array()
            .and_then(|items| items.first())
            .and_then(Json::as_str)
            .is_some_and(|op| OPERATORS.contains(&op))
    }

    /// Parses an expression from JSON. Anything that is not an expression
    /// becomes a literal.
    ///
    /// # Errors
    ///
    /// Returns an error if an operator is given malformed arguments.
    pub fn parse(json: &Json) -> Result<Self, ExpressionError> {
        if !Self::is_expression(json) {
            return Ok(Self::Literal(Value::from_json(json)));
        }
        let items = json.as_array().map(Vec::as_slice).unwrap_or_default();
        let op = items[0].as_str().unwrap_or_default();
        let args = &items[1..];
        match op {
            "literal" => {
                let [value] = args else {
                    return Err(arity("literal", "1", args.len()));
                };
                Ok(Self::Literal(Value::from_json(value)))
            }
            "get" => Ok(Self::Get(key_arg("get", args)?)),
            "has" => Ok(Self::Has(key_arg("has", args)?)),
            "feature-state" => Ok(Self::FeatureState(key_arg("feature-state", args)?)),
            "global-state" => Ok(Self::GlobalState(key_arg("global-state", args)?)),
            "zoom" => no_args("zoom", args, Self::Zoom),
            "heatmap-density" => no_args("heatmap-density", args, Self::HeatmapDensity),
            "line-progress" => no_args("line-progress", args, Self::LineProgress),
            "interpolate" => parse_interpolate(args),
            "step" => parse_step(args),
            "coalesce" => Ok(Self::Coalesce(
                args.iter().map(Self::parse).collect::<Result<_, _>>()?,
            )),
            "case" => parse_case(args),
            "==" | "!=" => {
                let [lhs, rhs] = args else {
                    return Err(arity(if op == "==" { "==" } else { "!=" }, "2", args.len()));
                };
                Ok(Self::Equals {
                    lhs: Box::new(Self::parse(lhs)?),
                    rhs: Box::new(Self::parse(rhs)?),
                    negate: op == "!=",
                })
            }
            "to-color" => {
                if args.is_empty() {
                    return Err(arity("to-color", "at least 1", 0));
                }
                Ok(Self::ToColor(
                    args.iter().map(Self::parse).collect::<Result<_, _>>()?,
                ))
            }
            "format" => parse_format(args),
            "image" => {
                let [name] = args else {
                    return Err(arity("image", "1", args.len()));
                };
                Ok(Self::Image(Box::new(Self::parse(name)?)))
            }
            _ => Err(ExpressionError::Evaluation(format!("unknown operator \"{op}\""))),
        }
    }

    /// Calls `f` on each direct child expression.
    pub fn each_child(&self, f: &mut impl FnMut(&Self)) {
        match self {
            Self::Literal(_)
            | Self::Get(_)
            | Self::Has(_)
            | Self::FeatureState(_)
            | Self::GlobalState(_)
            | Self::Zoom
            | Self::HeatmapDensity
            | Self::LineProgress => {}
            Self::Interpolate { input, stops, .. } => {
                f(input);
                stops.iter().for_each(|(_, out)| f(out));
            }
            Self::Step {
                input,
                default,
                stops,
            } => {
                f(input);
                f(default);
                stops.iter().for_each(|(_, out)| f(out));
            }
            Self::Coalesce(args) | Self::ToColor(args) => args.iter().for_each(f),
            Self::Case {
                branches,
                otherwise,
            } => {
                for (condition, output) in branches {
                    f(condition);
                    f(output);
                }
                f(otherwise);
            }
            Self::Equals { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            Self::Format(sections) => {
                for section in sections {
                    f(&section.content);
                    [&section.scale, &section.font_stack, &section.text_color]
                        .into_iter()
                        .flatten()
                        .for_each(&mut *f);
                }
            }
            Self::Image(name) => f(name),
        }
    }

    /// Returns `true` if any node in this tree satisfies `predicate`.
    pub fn any(&self, predicate: &impl Fn(&Self) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        let mut found = false;
        self.each_child(&mut |child| found = found || child.any(predicate));
        found
    }

    /// Returns `true` if the expression never reads the zoom.
    #[must_use]
    pub fn is_zoom_constant(&self) -> bool {
        !self.any(&|e| matches!(e, Self::Zoom))
    }

    /// Returns `true` if the expression never reads feature data or state.
    #[must_use]
    pub fn is_feature_constant(&self) -> bool {
        !self.any(&|e| matches!(e, Self::Get(_) | Self::Has(_) | Self::FeatureState(_)))
    }

    /// The evaluation class of this expression.
    #[must_use]
    pub fn kind(&self) -> ExpressionKind {
        ExpressionKind::from_dependencies(self.is_zoom_constant(), self.is_feature_constant())
    }

    /// Rewrites literal outputs so they carry `coerce`d values.
    ///
    /// Only output positions are rewritten; stop inputs and conditions keep
    /// their literal types.
    #[must_use]
    pub fn map_outputs(self, coerce: &impl Fn(Value) -> Value) -> Self {
        let map_stops = |stops: Vec<(f64, Self)>| -> Vec<(f64, Self)> {
            stops
                .into_iter()
                .map(|(z, out)| (z, out.map_outputs(coerce)))
                .collect()
        };
        match self {
            Self::Literal(value) => Self::Literal(coerce(value)),
            Self::Interpolate {
                interpolation,
                input,
                stops,
            } => Self::Interpolate {
                interpolation,
                input,
                stops: map_stops(stops),
            },
            Self::Step {
                input,
                default,
                stops,
            } => Self::Step {
                input,
                default: Box::new(default.map_outputs(coerce)),
                stops: map_stops(stops),
            },
            Self::Coalesce(args) => {
                Self::Coalesce(args.into_iter().map(|a| a.map_outputs(coerce)).collect())
            }
            Self::Case {
                branches,
                otherwise,
            } => Self::Case {
                branches: branches
                    .into_iter()
                    .map(|(c, o)| (c, o.map_outputs(coerce)))
                    .collect(),
                otherwise: Box::new(otherwise.map_outputs(coerce)),
            },
            other => other,
        }
    }

    /// Evaluates the expression.
    ///
    /// # Errors
    ///
    /// Returns an error when an operand has the wrong runtime type, e.g. a
    /// non-numeric `interpolate` input.
    pub fn evaluate(
        &self,
        globals: &Globals<'_>,
        ctx: &FeatureContext<'_>,
    ) -> Result<Value, ExpressionError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Get(key) => Ok(ctx
                .feature
                .and_then(|f| f.properties.get(key))
                .cloned()
                .unwrap_or_default()),
            Self::Has(key) => Ok(Value::Bool(
                ctx.feature.is_some_and(|f| f.properties.contains_key(key)),
            )),
            Self::FeatureState(key) => Ok(ctx
                .feature_state
                .and_then(|s| s.get(key))
                .cloned()
                .unwrap_or_default()),
            Self::GlobalState(key) => Ok(globals.global_state.get(key).cloned().unwrap_or_default()),
            Self::Zoom => Ok(Value::Number(globals.zoom)),
            Self::HeatmapDensity => Ok(Value::Number(globals.heatmap_density.unwrap_or(0.0))),
            Self::LineProgress => Ok(Value::Number(globals.line_progress.unwrap_or(0.0))),
            Self::Interpolate {
                interpolation,
                input,
                stops,
            } => {
                let x = number_input("interpolate", input.evaluate(globals, ctx)?)?;
                evaluate_interpolate(*interpolation, x, stops, globals, ctx)
            }
            Self::Step {
                input,
                default,
                stops,
            } => {
                let x = number_input("step", input.evaluate(globals, ctx)?)?;
                match stops.iter().rposition(|(z, _)| *z <= x) {
                    Some(i) => stops[i].1.evaluate(globals, ctx),
                    None => default.evaluate(globals, ctx),
                }
            }
            Self::Coalesce(args) => {
                // Arguments that fail count as null so a later fallback applies.
                for arg in args {
                    match arg.evaluate(globals, ctx) {
                        Ok(Value::Null) | Err(_) => {}
                        Ok(value) => return Ok(value),
                    }
                }
                Ok(Value::Null)
            }
            Self::Case {
                branches,
                otherwise,
            } => {
                for (condition, output) in branches {
                    if condition.evaluate(globals, ctx)?.is_truthy() {
                        return output.evaluate(globals, ctx);
                    }
                }
                otherwise.evaluate(globals, ctx)
            }
            Self::Equals { lhs, rhs, negate } => {
                let equal = lhs.evaluate(globals, ctx)? == rhs.evaluate(globals, ctx)?;
                Ok(Value::Bool(equal != *negate))
            }
            Self::ToColor(args) => {
                let mut last = Value::Null;
                for arg in args {
                    last = arg.evaluate(globals, ctx)?;
                    if let Some(color) = to_color(&last) {
                        return Ok(Value::Color(color));
                    }
                }
                Err(ExpressionError::Evaluation(format!(
                    "could not parse color from value '{}'",
                    last.to_json()
                )))
            }
            Self::Format(sections) => {
                let mut formatted = Formatted::default();
                for section in sections {
                    formatted.sections.push(evaluate_section(section, globals, ctx)?);
                }
                Ok(Value::Formatted(formatted))
            }
            Self::Image(name) => match name.evaluate(globals, ctx)? {
                Value::String(s) => Ok(Value::String(s)),
                other => Err(ExpressionError::Evaluation(format!(
                    "expected image name, found {}",
                    other.type_name()
                ))),
            },
        }
    }
}

fn arity(operator: &'static str, expected: &'static str, found: usize) -> ExpressionError {
    ExpressionError::WrongArity {
        operator,
        expected,
        found,
    }
}

fn key_arg(operator: &'static str, args: &[Json]) -> Result<String, ExpressionError> {
    match args {
        [Json::String(key)] => Ok(key.clone()),
        [other] => Err(ExpressionError::mismatch(operator, "string key", other)),
        _ => Err(arity(operator, "1", args.len())),
    }
}

fn no_args(operator: &'static str, args: &[Json], expr: Expr) -> Result<Expr, ExpressionError> {
    if args.is_empty() {
        Ok(expr)
    } else {
        Err(arity(operator, "0", args.len()))
    }
}

fn parse_stops(operator: &'static str, pairs: &[Json]) -> Result<Vec<(f64, Expr)>, ExpressionError> {
    if pairs.is_empty() || pairs.len() % 2 != 0 {
        return Err(arity(operator, "an even number of stop arguments", pairs.len()));
    }
    let mut stops: Vec<(f64, Expr)> = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks_exact(2) {
        let z = pair[0]
            .as_f64()
            .ok_or_else(|| ExpressionError::mismatch(operator, "numeric stop input", &pair[0]))?;
        if stops.last().is_some_and(|(prev, _)| *prev >= z) {
            return Err(ExpressionError::UnorderedStops);
        }
        stops.push((z, Expr::parse(&pair[1])?));
    }
    Ok(stops)
}

fn parse_interpolate(args: &[Json]) -> Result<Expr, ExpressionError> {
    if args.len() < 4 {
        return Err(arity("interpolate", "at least 4", args.len()));
    }
    let interpolation = match args[0].as_array().map(Vec::as_slice) {
        Some([Json::String(kind)]) if kind == "linear" => Interpolation::Linear,
        Some([Json::String(kind), base]) if kind == "exponential" => Interpolation::Exponential(
            base.as_f64()
                .ok_or_else(|| ExpressionError::mismatch("exponential", "numeric base", base))?,
        ),
        _ => {
            return Err(ExpressionError::mismatch(
                "interpolate",
                "[\"linear\"] or [\"exponential\", base]",
                &args[0],
            ));
        }
    };
    Ok(Expr::Interpolate {
        interpolation,
        input: Box::new(Expr::parse(&args[1])?),
        stops: parse_stops("interpolate", &args[2..])?,
    })
}

fn parse_step(args: &[Json]) -> Result<Expr, ExpressionError> {
    if args.len() < 2 {
        return Err(arity("step", "at least 2", args.len()));
    }
    let stops = if args.len() > 2 {
        parse_stops("step", &args[2..])?
    } else {
        Vec::new()
    };
    Ok(Expr::Step {
        input: Box::new(Expr::parse(&args[0])?),
        default: Box::new(Expr::parse(&args[1])?),
        stops,
    })
}

fn parse_case(args: &[Json]) -> Result<Expr, ExpressionError> {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(arity("case", "an odd number, at least 3", args.len()));
    }
    let (pairs, fallback) = args.split_at(args.len() - 1);
    let branches = pairs
        .chunks_exact(2)
        .map(|pair| Ok((Expr::parse(&pair[0])?, Expr::parse(&pair[1])?)))
        .collect::<Result<_, ExpressionError>>()?;
    Ok(Expr::Case {
        branches,
        otherwise: Box::new(Expr::parse(&fallback[0])?),
    })
}

fn parse_format(args: &[Json]) -> Result<Expr, ExpressionError> {
    if args.is_empty() {
        return Err(arity("format", "at least 1", 0));
    }
    let mut sections: Vec<FormatSection> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let content = Expr::parse(&args[i])?;
        let mut section = FormatSection {
            content,
            scale: None,
            font_stack: None,
            text_color: None,
        };
        if let Some(Json::Object(options)) = args.get(i + 1) {
            let option = |key: &str| options.get(key).map(Expr::parse).transpose();
            section.scale = option("font-scale")?;
            section.font_stack = option("text-font")?;
            section.text_color = option("text-color")?;
            i += 1;
        }
        sections.push(section);
        i += 1;
    }
    Ok(Expr::Format(sections))
}

fn number_input(operator: &str, value: Value) -> Result<f64, ExpressionError> {
    value.as_number().ok_or_else(|| {
        ExpressionError::Evaluation(format!(
            "{operator} input must be a number, found {}",
            value.type_name()
        ))
    })
}

fn evaluate_interpolate(
    interpolation: Interpolation,
    x: f64,
    stops: &[(f64, Expr)],
    globals: &Globals<'_>,
    ctx: &FeatureContext<'_>,
) -> Result<Value, ExpressionError> {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(Value::Null),
    };
    if x <= first.0 {
        return first.1.evaluate(globals, ctx);
    }
    if x >= last.0 {
        return last.1.evaluate(globals, ctx);
    }
    let upper = stops.partition_point(|(z, _)| *z <= x);
    let (lower_z, lower_out) = &stops[upper - 1];
    let (upper_z, upper_out) = &stops[upper];
    let t = interpolate::interpolation_factor(x, interpolation.base(), *lower_z, *upper_z);
    let a = lower_out.evaluate(globals, ctx)?;
    let b = upper_out.evaluate(globals, ctx)?;
    interpolate::value(&a, &b, t).ok_or_else(|| {
        ExpressionError::Evaluation(format!(
            "cannot interpolate {} and {}",
            a.type_name(),
            b.type_name()
        ))
    })
}

fn to_color(value: &Value) -> Option<peniko::Color> {
    match value {
        Value::Color(c) => Some(*c),
        Value::String(s) => parse_color(s),
        Value::Array(items) if items.len() == 3 || items.len() == 4 => {
            let mut channels = [0.0_f32; 4];
            channels[3] = 1.0;
            for (i, item) in items.iter().enumerate() {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "color components are stored as f32"
                )]
                let n = item.as_number()? as f32;
                channels[i] = if i < 3 { n / 255.0 } else { n };
            }
            Some(peniko::Color::new(channels))
        }
        _ => None,
    }
}

fn evaluate_section(
    section: &FormatSection,
    globals: &Globals<'_>,
    ctx: &FeatureContext<'_>,
) -> Result<FormattedSection, ExpressionError> {
    let text = match section.content.evaluate(globals, ctx)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Formatted(f) => f.to_plain_text(),
        other => other.to_json().to_string(),
    };
    let scale = match &section.scale {
        Some(expr) => expr.evaluate(globals, ctx)?.as_number(),
        None => None,
    };
    let font_stack = match &section.font_stack {
        Some(expr) => match expr.evaluate(globals, ctx)? {
            Value::String(s) => Some(s),
            Value::Array(fonts) => Some(
                fonts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        },
        None => None,
    };
    let text_color = match &section.text_color {
        Some(expr) => to_color(&expr.evaluate(globals, ctx)?),
        None => None,
    };
    Ok(FormattedSection {
        text,
        scale,
        font_stack,
        text_color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(json: Json, zoom: f64) -> Value {
        let state = GlobalState::new();
        Expr::parse(&json)
            .unwrap()
            .evaluate(&Globals::new(zoom, &state), &FeatureContext::EMPTY)
            .unwrap()
    }

    #[test]
    fn non_expressions_are_literals() {
        assert_eq!(
            Expr::parse(&json!(["Open Sans", "Arial"])).unwrap(),
            Expr::Literal(Value::Array(vec![
                Value::from("Open Sans"),
                Value::from("Arial")
            ]))
        );
        assert_eq!(Expr::parse(&json!(3)).unwrap(), Expr::Literal(Value::Number(3.0)));
    }

    #[test]
    fn interpolate_between_breakpoints() {
        let expr = json!(["interpolate", ["linear"], ["zoom"], 0, 1, 5, 1, 7, 0]);
        assert_eq!(eval(expr.clone(), 6.0), Value::Number(0.5));
        assert_eq!(eval(expr.clone(), -1.0), Value::Number(1.0));
        assert_eq!(eval(expr, 10.0), Value::Number(0.0));
    }

    #[test]
    fn step_selects_lower_stop() {
        let expr = json!(["step", ["zoom"], "a", 5, "b", 10, "c"]);
        assert_eq!(eval(expr.clone(), 4.0), Value::from("a"));
        assert_eq!(eval(expr.clone(), 5.0), Value::from("b"));
        assert_eq!(eval(expr, 12.0), Value::from("c"));
    }

    #[test]
    fn kinds() {
        let kind = |j: Json| Expr::parse(&j).unwrap().kind();
        assert_eq!(kind(json!(1)), ExpressionKind::Constant);
        assert_eq!(kind(json!(["global-state", "size"])), ExpressionKind::Constant);
        assert_eq!(
            kind(json!(["interpolate", ["linear"], ["zoom"], 0, 1, 1, 2])),
            ExpressionKind::Camera
        );
        assert_eq!(kind(json!(["get", "x"])), ExpressionKind::Source);
        assert_eq!(kind(json!(["feature-state", "hover"])), ExpressionKind::Source);
        assert_eq!(
            kind(json!(["interpolate", ["linear"], ["zoom"], 0, ["get", "a"], 1, 2])),
            ExpressionKind::Composite
        );
    }

    #[test]
    fn feature_and_global_lookups() {
        let mut state = GlobalState::new();
        state.set("size", 17.0);
        let feature = Feature::new().with_property("name", "x");
        let feature_state = FeatureState::new();
        let globals = Globals::new(0.0, &state);
        let ctx = FeatureContext::new(&feature, &feature_state);

        let get = Expr::parse(&json!(["get", "name"])).unwrap();
        assert_eq!(get.evaluate(&globals, &ctx).unwrap(), Value::from("x"));
        assert_eq!(
            get.evaluate(&globals, &FeatureContext::EMPTY).unwrap(),
            Value::Null
        );
        let global = Expr::parse(&json!(["global-state", "size"])).unwrap();
        assert_eq!(
            global.evaluate(&globals, &ctx).unwrap(),
            Value::Number(17.0)
        );
    }

    #[test]
    fn format_sections_carry_overrides() {
        let expr = Expr::parse(&json!(["format", "a", {}, "b", {"text-color": "red"}])).unwrap();
        let Expr::Format(sections) = &expr else {
            panic!("expected format expression");
        };
        assert!(!sections[0].has_override_for("text-color"));
        assert!(sections[1].has_override_for("text-color"));

        let value = eval(json!(["format", "a", {}, "b", {"text-color": "red"}]), 0.0);
        let formatted = value.as_formatted().unwrap();
        assert_eq!(formatted.to_plain_text(), "ab");
        assert!(formatted.sections[0].text_color.is_none());
        assert!(formatted.sections[1].text_color.is_some());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            Expr::parse(&json!(["get"])),
            Err(ExpressionError::WrongArity { .. })
        ));
        assert_eq!(
            Expr::parse(&json!(["interpolate", ["linear"], ["zoom"], 5, 1, 3, 2])),
            Err(ExpressionError::UnorderedStops)
        );
        assert!(Expr::parse(&json!(["interpolate", ["cubic"], ["zoom"], 0, 1])).is_err());
    }

    #[test]
    fn case_and_equality() {
        let expr = json!(["case", ["==", ["zoom"], 3], "three", "other"]);
        assert_eq!(eval(expr.clone(), 3.0), Value::from("three"));
        assert_eq!(eval(expr, 4.0), Value::from("other"));
    }
}
