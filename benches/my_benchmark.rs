use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::Rng;
use safepath_router::graph::GraphBuilder;
use safepath_router::{BoundingBox, Coord, Router};

fn area() -> BoundingBox {
    BoundingBox::new(Coord::new(40.70, -74.02), Coord::new(40.80, -73.93))
}

fn random_coord_in(area: BoundingBox) -> Coord {
    let mut rng = rand::rng();
    Coord::new(
        rng.random_range(area.sw.lat..area.ne.lat),
        rng.random_range(area.sw.lng..area.ne.lng),
    )
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("build_graph", |b| {
        b.iter_batched(
            || GraphBuilder::new(25, 0.2),
            |builder| black_box(builder.build(area()).unwrap()),
            BatchSize::SmallInput,
        );
    });

    let router = Router::new();
    router
        .build_graph_with(area(), GraphBuilder::new(30, 0.2))
        .unwrap();

    c.bench_function("route", |b| {
        b.iter_batched(
            || (random_coord_in(area()), random_coord_in(area())),
            |(start, end)| black_box(router.route(start, end, 0.5)),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("alternatives", |b| {
        b.iter_batched(
            || (random_coord_in(area()), random_coord_in(area())),
            |(start, end)| black_box(router.alternatives(start, end, 3)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
