//! Copy-in benchmarks for engine buffers.
//!
//! Compares zero-copy borrowing, cast-only copies and transposing copies of
//! square matrices.
//!
//! Run with: cargo bench --bench copy_in

use colmajor::{Buffer, DenseArray, InOut, StorageOrder};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

fn random_matrix<T>(size: usize, order: StorageOrder, rng: &mut StdRng) -> DenseArray<T>
where
    T: Clone + Default,
    rand::distributions::Standard: rand::distributions::Distribution<T>,
{
    DenseArray::from_fn(&[size, size], order, |_| rng.gen())
}

fn bench_copy_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_in");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for size in [64usize, 256, 1024] {
        group.throughput(Throughput::Elements((size * size) as u64));

        let mut rng = StdRng::seed_from_u64(42);
        let col: DenseArray<f64> = random_matrix(size, StorageOrder::ColumnMajor, &mut rng);
        let row: DenseArray<f64> = random_matrix(size, StorageOrder::RowMajor, &mut rng);
        let single: DenseArray<f32> = random_matrix(size, StorageOrder::ColumnMajor, &mut rng);

        group.bench_with_input(BenchmarkId::new("borrow", size), &size, |b, _| {
            b.iter(|| Buffer::<f64>::from_container("a", &col, StorageOrder::ColumnMajor).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("owned_same_order", size), &size, |b, _| {
            b.iter(|| {
                Buffer::<f64, InOut>::from_container("a", &col, StorageOrder::ColumnMajor).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("cast_f32", size), &size, |b, _| {
            b.iter(|| Buffer::<f64>::from_container("a", &single, StorageOrder::ColumnMajor).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("transpose", size), &size, |b, _| {
            b.iter(|| Buffer::<f64>::from_container("a", &row, StorageOrder::ColumnMajor).unwrap())
        });
    }
    group.finish();
}

fn bench_copy_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_back");
    group.sample_size(20);

    for size in [64usize, 256, 1024] {
        group.throughput(Throughput::Elements((size * size) as u64));

        let mut rng = StdRng::seed_from_u64(7);
        let src: DenseArray<f64> = random_matrix(size, StorageOrder::ColumnMajor, &mut rng);
        let buf = Buffer::<f64, InOut>::from_container("a", &src, StorageOrder::ColumnMajor).unwrap();
        let mut same = DenseArray::<f64>::col_major(&[size, size]);
        let mut transposed = DenseArray::<f64>::row_major(&[size, size]);

        group.bench_with_input(BenchmarkId::new("same_order", size), &size, |b, _| {
            b.iter(|| buf.copy_back(&mut same).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("transpose", size), &size, |b, _| {
            b.iter(|| buf.copy_back(&mut transposed).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("shrink_half", size), &size, |b, _| {
            b.iter(|| {
                let mut out = DenseArray::<f64>::col_major(&[size, size]);
                buf.copy_back_resized(&mut out, &[size / 2, size / 2]).unwrap();
                out
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_copy_in, bench_copy_back);
criterion_main!(benches);
