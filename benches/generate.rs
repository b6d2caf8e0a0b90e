use criterion::black_box;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use kernelgen::generate::{GeneratorOptions, KernelGenerator};
use kernelgen::process::gaussian::kernel::RBFKernel;

fn bench_prior(c: &mut Criterion) {
    let mut group = c.benchmark_group("KernelGenerator, prior");
    for length in [16, 64, 128] {
        let opts = GeneratorOptions::new(length);
        group.bench_with_input(
            format!("length {}", length),
            &opts,
            |b, opts| {
                b.iter_batched_ref(
                    || KernelGenerator::seeded(RBFKernel::default(), 1),
                    |gen| black_box(gen.generate(opts)),
                    BatchSize::SmallInput,
                )
            },
        );
    }
}

fn bench_posterior(c: &mut Criterion) {
    let training: Vec<(f64, f64)> =
        (0..16).map(|i| (i as f64 * 4.0, (i as f64).sin())).collect();
    let mut group = c.benchmark_group("KernelGenerator, posterior");
    for joint in [false, true] {
        let opts = GeneratorOptions::new(64).with_joint_posterior(joint);
        group.bench_with_input(
            format!("joint = {}", joint),
            &opts,
            |b, opts| {
                b.iter_batched_ref(
                    || {
                        KernelGenerator::seeded(RBFKernel::default(), 1)
                            .with_training(training.clone())
                    },
                    |gen| black_box(gen.generate(opts)),
                    BatchSize::SmallInput,
                )
            },
        );
    }
}

criterion_group!(generate_benches, bench_prior, bench_posterior);
criterion_main!(generate_benches);
