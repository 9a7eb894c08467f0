use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use product_api::{JsonStorage, ProductInput};
use tempfile::tempdir;

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_storage_create");

    // 每次写入都会整体重写文件，耗时随已有产品数量增长
    for existing in [0usize, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("existing", existing),
            existing,
            |b, &existing| {
                let dir = tempdir().unwrap();
                let storage = JsonStorage::initialize(dir.path().join("products.json")).unwrap();
                for i in 0..existing {
                    storage
                        .create(ProductInput::new(format!("seed-{i}"), 1.0))
                        .unwrap();
                }

                b.iter(|| {
                    let product = storage
                        .create(black_box(ProductInput::new("bench", 9.99)))
                        .unwrap();
                    black_box(product)
                })
            },
        );
    }

    group.finish();
}

fn bench_get_by_id(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::initialize(dir.path().join("products.json")).unwrap();
    for i in 0..1000 {
        storage
            .create(ProductInput::new(format!("seed-{i}"), 1.0))
            .unwrap();
    }

    c.bench_function("json_storage_get_by_id", |b| {
        b.iter(|| black_box(storage.get_by_id(black_box(500))))
    });

    c.bench_function("json_storage_list_all", |b| {
        b.iter(|| black_box(storage.list_all()))
    });
}

criterion_group!(benches, bench_create, bench_get_by_id);
criterion_main!(benches);
