use chanpool::{Pool, PoolConfiguration};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn pool(max: usize) -> Pool<Vec<u8>> {
    let config = PoolConfiguration::new()
        .with_initial_cap(max)
        .with_max_cap(max)
        .with_factory(|| Ok(vec![0u8; 1024]))
        .with_close(|_| Ok(()));
    Pool::new(config).unwrap()
}

fn bench_get_put(c: &mut Criterion) {
    let pool = pool(64);
    c.bench_function("get_put_idle", |b| {
        b.iter(|| {
            let conn = pool.get().unwrap();
            pool.put(black_box(conn));
        })
    });

    c.bench_function("guard_roundtrip", |b| {
        b.iter(|| {
            let conn = pool.get_guard().unwrap();
            black_box(conn.len());
        })
    });
}

fn bench_exhausted(c: &mut Criterion) {
    let pool = pool(1);
    let _held = pool.get().unwrap();
    c.bench_function("get_exhausted", |b| b.iter(|| black_box(pool.get().is_err())));
}

criterion_group!(benches, bench_get_put, bench_exhausted);
criterion_main!(benches);
