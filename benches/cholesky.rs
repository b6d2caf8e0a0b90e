use criterion::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use kernelgen::linalg::{Cholesky, Matrix};
use kernelgen::process::gaussian::kernel::{Kernel, RBFKernel};

fn rbf_cov(n: usize) -> Matrix {
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mut cov = RBFKernel::new_unchecked(2.0, 1.0)
        .covariance_sym(&Matrix::from_column(&xs));
    cov.add_to_diagonal(1E-6);
    cov
}

fn bench_cholesky(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cholesky, RBF covariance");
    for n in [16, 64, 128, 256] {
        let cov = rbf_cov(n);
        group.bench_function(format!("{} points", n), |b| {
            b.iter(|| black_box(Cholesky::new(&cov)))
        });
    }
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cholesky solve");
    for n in [16, 64, 128, 256] {
        let l = Cholesky::new(&rbf_cov(n)).unwrap();
        let b_vec: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
        group.bench_function(format!("{} points", n), |b| {
            b.iter(|| black_box(l.solve(&b_vec)))
        });
    }
}

criterion_group!(cholesky_benches, bench_cholesky, bench_solve);
criterion_main!(cholesky_benches);
