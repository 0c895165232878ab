use geo::{coord, Geometry, LineString, Rect};

use criterion::{criterion_group, criterion_main, Criterion};
use geolabel::{
    Arrangement, CancellationToken, Engine, EngineSettings, FeatureId, LabelFeature, LabelInfo,
    LabelingBoundary, LayerSettings, LinePlacementFlags,
};

fn create_engine() -> Engine {
    let settings = EngineSettings {
        candidates_line: 32,
        ..Default::default()
    };
    let mut engine = Engine::new(settings);
    let flags = LinePlacementFlags {
        above_line: true,
        below_line: true,
        on_line: true,
        map_orientation: false,
    };
    engine
        .add_layer(LayerSettings::new("rivers", Arrangement::Curved).with_line_flags(flags))
        .unwrap();

    for i in 0..50 {
        // a slow sine wave
        let line: LineString = (0..200)
            .map(|j| {
                let x = j as f64 * 0.5;
                (x, i as f64 * 10.0 + (x / 8.0).sin() * 3.0)
            })
            .collect::<Vec<_>>()
            .into();
        let info = LabelInfo::new(vec![0.6; 12], 1.0).with_max_char_angles(20.0, -20.0);
        let feature = LabelFeature::new(FeatureId(i), Geometry::LineString(line), 7.2, 1.0)
            .with_label_info(info);
        engine.register_feature("rivers", feature).unwrap();
    }
    engine
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let engine = create_engine();
    let extent = Rect::new(coord! { x: -10., y: -10. }, coord! { x: 110., y: 510. });
    let boundary = LabelingBoundary::from_rect(extent);

    c.bench_function("curved placement along waves", |b| {
        b.iter(|| {
            let _ = engine.extract_problem(&extent, &boundary, &CancellationToken::new());
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
