use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use herk::device::HostDevice;
use herk::harness::{HerkBench, HerkParams, RunConfig, RunMode, run};
use herk::kernels::naive::herk_naive;
use herk::kernels::threaded::herk_threaded;
use herk::kernels::{HerkArgs, flops};
use herk::layout::{MatrixLayoutSpec, Order, Transpose, Uplo, resolve};
use num_complex::Complex;

fn args_for(n: usize, k: usize) -> HerkArgs<f32> {
    HerkArgs {
        order: Order::ColumnMajor,
        uplo: Uplo::Upper,
        trans_a: Transpose::NoTrans,
        n,
        k,
        alpha: 1.0,
        beta: 1.0,
        offa: 0,
        lda: n,
        offc: 0,
        ldc: n,
    }
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("cherk");
    group.sample_size(10);

    for &size in &[64usize, 128, 256] {
        let args = args_for(size, size);
        let a: Vec<Complex<f32>> = (0..size * size)
            .map(|i| Complex::new((i % 7) as f32, (i % 5) as f32))
            .collect();
        let c_init: Vec<Complex<f32>> = vec![Complex::new(1.0, 0.0); size * size];

        group.throughput(Throughput::Elements(flops(size, size) as u64));

        group.bench_with_input(BenchmarkId::new("naive", size), &size, |b, _| {
            let mut c = c_init.clone();
            b.iter(|| herk_naive(black_box(&args), black_box(&a), &mut c));
        });

        group.bench_with_input(BenchmarkId::new("threaded", size), &size, |b, _| {
            let mut c = c_init.clone();
            b.iter(|| herk_threaded(black_box(&args), black_box(&a), &mut c, 4));
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("zherk_harness");
    group.sample_size(10);

    for mode in [RunMode::Standard, RunMode::Roundtrip] {
        let params = HerkParams {
            n: 128,
            k: 64,
            ..HerkParams::default()
        };
        let config = RunConfig {
            iterations: 1,
            warmup: 0,
            mode,
            ..RunConfig::default()
        };

        group.bench_function(format!("{:?}", mode), |b| {
            let mut bench = HerkBench::<f64>::new(HostDevice::default());
            b.iter(|| run(&mut bench, &params, &config).unwrap());
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let spec = MatrixLayoutSpec::new(Order::RowMajor, Transpose::ConjTrans, 1024, 256).with_lda(1040);
    c.bench_function("resolve", |b| b.iter(|| resolve(black_box(&spec))));
}

criterion_group!(benches, bench_kernels, bench_roundtrip, bench_resolve);
criterion_main!(benches);
