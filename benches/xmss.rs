use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};
use xmssmt::{Xmss, XmssParams};

static ALG_NAME: &str = "XMSS-SHA2_10_256";

fn xmss_benchmarks(c: &mut Criterion) {
    let params = XmssParams::from_name(ALG_NAME).unwrap();
    let xmss = Xmss::new(params).unwrap();

    let mut group = c.benchmark_group(ALG_NAME);
    group.sample_size(10);

    group.bench_function(BenchmarkId::new("keygen", ""), |b| {
        b.iter(|| black_box(xmss.keygen()));
    });

    let (pk, sk) = xmss.keygen();
    let message = *b"benchmark message";

    group.bench_function(BenchmarkId::new("sign", ""), |b| {
        b.iter_custom(|num_iters| {
            let mut total = Duration::ZERO;

            for _ in 0..num_iters {
                // Precomputation: a fresh key state per iteration so the
                // leaf budget is never exhausted mid-run.
                let mut sk = sk.clone();

                // Start timer
                let start = Instant::now();

                // Benchmark
                black_box(xmss.sign(&mut sk, &message).unwrap());

                // Stop timer
                total += start.elapsed();
            }
            total
        });
    });

    let mut sk = sk;
    let sig = xmss.sign(&mut sk, &message).unwrap();

    group.bench_function(BenchmarkId::new("verify", ""), |b| {
        b.iter(|| black_box(xmss.verify(&pk, &message, &sig).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, xmss_benchmarks);
criterion_main!(benches);
