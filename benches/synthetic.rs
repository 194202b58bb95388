use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rectisweep::{
    generators::{diamonds, gap_waypoints, grid, nested_groups, slanted_grid},
    sparse_visibility_graph, ScanDirection, SweepConfig, SweepPass,
};

fn just_the_sweep(c: &mut Criterion) {
    let obs = grid(10);
    let config = SweepConfig::default();

    c.bench_function("just the sweep", |b| {
        b.iter(|| {
            SweepPass::new(&obs, &[], ScanDirection::Horizontal, &config)
                .unwrap()
                .run()
                .unwrap()
        })
    });
}

fn reflections(c: &mut Criterion) {
    let obs = slanted_grid(10);
    let ports = gap_waypoints(10);
    let config = SweepConfig::default();

    c.bench_function("slanted grid", |b| {
        b.iter(|| black_box(sparse_visibility_graph(&obs, &ports, &config).unwrap()))
    });

    let obs = diamonds(10);
    c.bench_function("diamonds", |b| {
        b.iter(|| black_box(sparse_visibility_graph(&obs, &[], &config).unwrap()))
    });
}

fn groups(c: &mut Criterion) {
    let obs = nested_groups(10);
    let config = SweepConfig::default();

    c.bench_function("nested groups", |b| {
        b.iter(|| black_box(sparse_visibility_graph(&obs, &[], &config).unwrap()))
    });
}

criterion_group!(benches, just_the_sweep, reflections, groups);
criterion_main!(benches);
