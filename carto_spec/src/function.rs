// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of legacy function objects to expressions.
//!
//! A legacy function is a JSON object with `stops` (or `"type": "identity"`),
//! an optional `property`, `base`, `type`, and `default`. Zoom functions read
//! the zoom, property functions read a feature property, and zoom-and-property
//! functions key their stops by `{"zoom": z, "value": v}` objects.

use serde_json::{Map, Value as Json};

use crate::coerce::coerce;
use crate::error::ExpressionError;
use crate::expression::{Expr, Interpolation};
use crate::specification::PropertySpecification;
use crate::value::Value;

/// Returns `true` if `json` is a legacy function object.
#[must_use]
pub fn is_function(json: &Json) -> bool {
    json.as_object().is_some_and(|obj| {
        obj.contains_key("stops") || obj.get("type").and_then(Json::as_str) == Some("identity")
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    Identity,
    Exponential,
    Interval,
    Categorical,
}

/// Converts a legacy function object to an equivalent expression.
///
/// # Errors
///
/// Returns [`ExpressionError::InvalidFunction`] for malformed functions and
/// [`ExpressionError::UnorderedStops`] when numeric stops are not ascending.
pub fn convert(json: &Json, spec: &PropertySpecification) -> Result<Expr, ExpressionError> {
    let obj = json
        .as_object()
        .ok_or_else(|| ExpressionError::InvalidFunction("expected an object".into()))?;
    let ty = function_type(obj, spec)?;
    let property = match obj.get("property") {
        Some(Json::String(p)) => Some(p.clone()),
        Some(other) => {
            return Err(ExpressionError::mismatch("property", "string", other));
        }
        None => None,
    };
    let default = obj.get("default").map(|d| output(d, spec));
    let base = match obj.get("base") {
        Some(b) => b
            .as_f64()
            .ok_or_else(|| ExpressionError::mismatch("base", "number", b))?,
        None => 1.0,
    };

    if ty == FunctionType::Identity {
        let Some(property) = property else {
            return Err(ExpressionError::InvalidFunction(
                "identity functions require a property".into(),
            ));
        };
        return Ok(with_default(Expr::Get(property), default));
    }

    let stops = obj
        .get("stops")
        .and_then(Json::as_array)
        .filter(|stops| !stops.is_empty())
        .ok_or_else(|| ExpressionError::InvalidFunction("expected a non-empty stops array".into()))?;
    let stops = stops
        .iter()
        .map(|stop| match stop.as_array().map(Vec::as_slice) {
            Some([input, out]) => Ok((input, out)),
            _ => Err(ExpressionError::mismatch("stop", "[input, output]", stop)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let zoom_and_property = stops[0].0.is_object();
    match (property, zoom_and_property) {
        (None, _) => curve(ty, base, Expr::Zoom, &stops, default, spec),
        (Some(property), false) => curve(ty, base, Expr::Get(property), &stops, default, spec),
        (Some(property), true) => composite(ty, base, &property, &stops, default, spec),
    }
}

fn function_type(
    obj: &Map<String, Json>,
    spec: &PropertySpecification,
) -> Result<FunctionType, ExpressionError> {
    match obj.get("type").map(|t| t.as_str()) {
        None => Ok(if spec.interpolated() {
            FunctionType::Exponential
        } else {
            FunctionType::Interval
        }),
        Some(Some("identity")) => Ok(FunctionType::Identity),
        Some(Some("exponential")) if spec.interpolated() => Ok(FunctionType::Exponential),
        Some(Some("exponential")) => Err(ExpressionError::InvalidFunction(format!(
            "exponential functions not supported for \"{}\"",
            spec.name()
        ))),
        Some(Some("interval")) => Ok(FunctionType::Interval),
        Some(Some("categorical")) => Ok(FunctionType::Categorical),
        Some(_) => Err(ExpressionError::InvalidFunction(format!(
            "unknown function type {}",
            obj["type"]
        ))),
    }
}

fn output(json: &Json, spec: &PropertySpecification) -> Expr {
    Expr::Literal(coerce(Value::from_json(json), spec.ty()))
}

fn with_default(expr: Expr, default: Option<Expr>) -> Expr {
    match default {
        Some(default) => Expr::Coalesce(vec![expr, default]),
        None => expr,
    }
}

fn numeric_stops(
    stops: &[(&Json, &Json)],
    spec: &PropertySpecification,
) -> Result<Vec<(f64, Expr)>, ExpressionError> {
    let mut result: Vec<(f64, Expr)> = Vec::with_capacity(stops.len());
    for &(input, out) in stops {
        let z = input
            .as_f64()
            .ok_or_else(|| ExpressionError::mismatch("stop input", "number", input))?;
        if result.last().is_some_and(|(prev, _)| *prev >= z) {
            return Err(ExpressionError::UnorderedStops);
        }
        result.push((z, output(out, spec)));
    }
    Ok(result)
}

fn curve(
    ty: FunctionType,
    base: f64,
    input: Expr,
    stops: &[(&Json, &Json)],
    default: Option<Expr>,
    spec: &PropertySpecification,
) -> Result<Expr, ExpressionError> {
    let expr = match ty {
        FunctionType::Exponential => Expr::Interpolate {
            interpolation: if base == 1.0 {
                Interpolation::Linear
            } else {
                Interpolation::Exponential(base)
            },
            input: Box::new(input),
            stops: numeric_stops(stops, spec)?,
        },
        FunctionType::Interval => {
            let mut numeric = numeric_stops(stops, spec)?;
            let (_, first) = numeric.remove(0);
            Expr::Step {
                input: Box::new(input),
                default: Box::new(first),
                stops: numeric,
            }
        }
        FunctionType::Categorical => {
            let branches = stops
                .iter()
                .map(|(key, out)| {
                    (
                        Expr::Equals {
                            lhs: Box::new(input.clone()),
                            rhs: Box::new(Expr::Literal(Value::from_json(key))),
                            negate: false,
                        },
                        output(out, spec),
                    )
                })
                .collect();
            return Ok(Expr::Case {
                branches,
                otherwise: Box::new(default.unwrap_or(Expr::Literal(Value::Null))),
            });
        }
        FunctionType::Identity => input,
    };
    Ok(with_default(expr, default))
}

fn composite(
    ty: FunctionType,
    base: f64,
    property: &str,
    stops: &[(&Json, &Json)],
    default: Option<Expr>,
    spec: &PropertySpecification,
) -> Result<Expr, ExpressionError> {
    // Group stops by zoom, keeping first-seen zoom order.
    let mut groups: Vec<(f64, Vec<(&Json, &Json)>)> = Vec::new();
    for &(input, out) in stops {
        let zoom = input
            .get("zoom")
            .and_then(Json::as_f64)
            .ok_or_else(|| ExpressionError::mismatch("stop input", "{zoom, value}", input))?;
        let value = input
            .get("value")
            .ok_or_else(|| ExpressionError::mismatch("stop input", "{zoom, value}", input))?;
        match groups.last_mut() {
            Some((z, group)) if *z == zoom => group.push((value, out)),
            Some((z, _)) if *z > zoom => return Err(ExpressionError::UnorderedStops),
            _ => groups.push((zoom, vec![(value, out)])),
        }
    }

    let inner = groups
        .into_iter()
        .map(|(zoom, group)| {
            let expr = curve(ty, base, Expr::Get(property.to_owned()), &group, None, spec)?;
            Ok((zoom, expr))
        })
        .collect::<Result<Vec<_>, ExpressionError>>()?;

    let outer = if spec.interpolated() {
        Expr::Interpolate {
            interpolation: if ty == FunctionType::Exponential && base != 1.0 {
                Interpolation::Exponential(base)
            } else {
                Interpolation::Linear
            },
            input: Box::new(Expr::Zoom),
            stops: inner,
        }
    } else {
        let mut inner = inner;
        let (_, first) = inner.remove(0);
        Expr::Step {
            input: Box::new(Expr::Zoom),
            default: Box::new(first),
            stops: inner,
        }
    };
    Ok(with_default(outer, default))
}
