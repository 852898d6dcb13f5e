use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nalgebra as na;
use projection_calibration::optimization::{
    EstimatorConfig, estimate_projection_matrix, estimate_projection_matrix_dlt,
    least_squares_solve,
};
use projection_calibration::synthetic::{SyntheticConfig, generate_correspondences};

fn bench_least_squares(c: &mut Criterion) {
    let a = na::DMatrix::from_row_slice(3, 2, &[2.0, 3.0, 7.0, 5.0, 2.0, 4.0]);
    let b = na::dvector![3.49, 7.60, 4.20];

    c.bench_function("least_squares_solve", |bench| {
        bench.iter(|| least_squares_solve(black_box(&a), black_box(&b)))
    });
}

fn bench_projection(c: &mut Criterion) {
    let data = generate_correspondences(&SyntheticConfig {
        num_points: 100,
        pixel_noise: 0.5,
        ..Default::default()
    });
    let config = EstimatorConfig::default();

    c.bench_function("estimate_projection_matrix", |bench| {
        bench.iter(|| estimate_projection_matrix(black_box(&data)))
    });
    c.bench_function("estimate_projection_matrix_dlt", |bench| {
        bench.iter(|| estimate_projection_matrix_dlt(black_box(&data), &config))
    });
}

criterion_group!(benches, bench_least_squares, bench_projection);
criterion_main!(benches);
