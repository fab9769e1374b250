// Copyright 2025 the Carto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `carto_property` + `carto_style`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;

use carto_property::{
    EvaluationParameters, Evaluated, PossiblyEvaluated, SetterOptions, TransitionParameters,
};
use carto_spec::{Feature, FeatureState};
use carto_style::{StyleLayer, StyleLayerFactory};
use serde_json::json;

fn line_layer(factory: &StyleLayerFactory) -> StyleLayer {
    factory
        .create_from_json(&json!({
            "id": "roads",
            "type": "line",
            "paint": {
                "line-color": ["get", "color"],
                "line-width": ["interpolate", ["linear"], ["zoom"], 10, 1, 16, 8],
                "line-opacity": 0.8
            }
        }))
        .unwrap()
}

fn bench_property(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: Evaluated={} PossiblyEvaluated={} StyleLayer={}",
            size_of::<Evaluated>(),
            size_of::<PossiblyEvaluated>(),
            size_of::<StyleLayer>(),
        );
    });

    let factory = StyleLayerFactory::new();

    let mut group = c.benchmark_group("property/recalculate");

    group.bench_function("idle", |b| {
        let mut layer = line_layer(&factory);
        let parameters = EvaluationParameters::new(13.0);
        b.iter(|| {
            layer.recalculate(&parameters);
            black_box(layer.paint().constant("line-width").cloned())
        });
    });

    group.bench_function("mid_transition", |b| {
        b.iter_batched(
            || {
                let mut layer = line_layer(&factory);
                layer
                    .set_paint_property("line-opacity", Some(json!(0.2)), SetterOptions::default())
                    .unwrap();
                layer.update_transitions(&TransitionParameters::new(0.0));
                layer
            },
            |mut layer| {
                layer.recalculate(&EvaluationParameters::new(13.0).with_now(150.0));
                black_box(layer)
            },
            BatchSize::SmallInput,
        );
    });

    for depth in [1_u32, 4, 16] {
        group.bench_function(BenchmarkId::new("transition_chain", depth), |b| {
            b.iter_batched(
                || {
                    let mut layer = line_layer(&factory);
                    for step in 0..depth {
                        let now = f64::from(step);
                        layer
                            .set_paint_property(
                                "line-opacity",
                                Some(json!(f64::from(step % 2))),
                                SetterOptions::default(),
                            )
                            .unwrap();
                        layer.update_transitions(&TransitionParameters::new(now));
                    }
                    layer
                },
                |mut layer| {
                    layer.recalculate(&EvaluationParameters::new(13.0).with_now(f64::from(depth)));
                    black_box(layer)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();

    let mut group = c.benchmark_group("property/evaluate");

    let mut layer = line_layer(&factory);
    layer.recalculate(&EvaluationParameters::new(13.0));
    let features: Vec<Feature> = (0..256)
        .map(|i| {
            let color = if i % 2 == 0 { "#ff0000" } else { "rgba(0, 0, 255, 0.5)" };
            Feature::new().with_property("color", color)
        })
        .collect();
    let state = FeatureState::new();

    group.bench_function(BenchmarkId::new("data_driven_color", features.len()), |b| {
        let color = layer.paint().data_driven("line-color").unwrap();
        b.iter(|| {
            for feature in &features {
                black_box(color.evaluate(feature, &state));
            }
        });
    });

    group.bench_function(BenchmarkId::new("constant_width", features.len()), |b| {
        let width = layer.paint().data_driven("line-width").unwrap();
        b.iter(|| {
            for feature in &features {
                black_box(width.evaluate(feature, &state));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_property);
criterion_main!(benches);
