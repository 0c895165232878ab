use geo::{coord, polygon, Geometry, Rect};

use criterion::{criterion_group, criterion_main, Criterion};
use geolabel::{
    Arrangement, CancellationToken, Engine, EngineSettings, FeatureId, LabelFeature,
    LabelingBoundary, LayerSettings,
};

fn create_engine() -> Engine {
    // An L shape, repeated across the extent
    let mut engine = Engine::new(EngineSettings::default());
    engine
        .add_layer(LayerSettings::new("areas", Arrangement::Free))
        .unwrap();
    for i in 0..100 {
        let dx = (i % 10) as f64 * 5.0;
        let dy = (i / 10) as f64 * 5.0;
        let poly = polygon![
            (x: dx, y: dy),
            (x: dx + 4.0, y: dy),
            (x: dx + 4.0, y: dy + 1.0),
            (x: dx + 1.0, y: dy + 1.0),
            (x: dx + 1.0, y: dy + 4.0),
            (x: dx, y: dy + 4.0),
            (x: dx, y: dy),
        ];
        let feature = LabelFeature::new(FeatureId(i), Geometry::Polygon(poly), 0.8, 0.3);
        engine.register_feature("areas", feature).unwrap();
    }
    engine
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let engine = create_engine();
    let extent = Rect::new(coord! { x: 0., y: 0. }, coord! { x: 50., y: 50. });
    let boundary = LabelingBoundary::from_rect(extent);

    c.bench_function("grid placement in L-shaped polygons", |b| {
        b.iter(|| {
            let _ = engine.extract_problem(&extent, &boundary, &CancellationToken::new());
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
