use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iec_core::{FieldShape, Parameters, SupportType};
use iec_solver::solve;

fn params(n_nodes: usize) -> Parameters {
    Parameters::builder()
        .n_nodes(n_nodes)
        .chi_kappa(0.04)
        .chi_e(-0.1)
        .field_shape(FieldShape::Gaussian {
            amplitude: 1.0,
            center: 0.2,
            width: 0.04,
        })
        .build()
        .expect("bench parameters")
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    for n_nodes in [100usize, 400, 1600] {
        let params = params(n_nodes);
        for support in [SupportType::Cantilever, SupportType::PinnedPinned] {
            group.bench_with_input(
                BenchmarkId::new(support.to_string(), n_nodes),
                &params,
                |b, params| {
                    b.iter(|| solve(black_box(params), support).expect("solve"));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
