//! Merge performance benchmarks.
//!
//! Measures detection and merge over generated customer/order/item schemas.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use amalgam::{Amalgam, Table, Value};

/// Build an engine holding customers, orders and order items.
fn generate_shop(customers: usize) -> Amalgam {
    let mut rng = StdRng::seed_from_u64(42);
    let orders = customers * 4;
    let items = orders * 3;

    let mut amalgam = Amalgam::new();
    amalgam.add_table(Table::new(
        "customers",
        vec!["id".into(), "name".into(), "region".into()],
        (0..customers as i64)
            .map(|i| {
                vec![
                    Value::Integer(i),
                    Value::Text(format!("Customer {i}")),
                    Value::Text(["north", "south", "east", "west"][i as usize % 4].into()),
                ]
            })
            .collect(),
    ));
    amalgam.add_table(Table::new(
        "orders",
        vec!["order_id".into(), "customer_id".into(), "total".into()],
        (0..orders as i64)
            .map(|i| {
                vec![
                    Value::Integer(i),
                    Value::Integer(rng.gen_range(0..customers as i64 + 10)),
                    Value::Float(rng.gen_range(1.0..500.0)),
                ]
            })
            .collect(),
    ));
    amalgam.add_table(Table::new(
        "order_items",
        vec!["item_id".into(), "order_id".into(), "qty".into()],
        (0..items as i64)
            .map(|i| {
                vec![
                    Value::Integer(i),
                    Value::Integer(rng.gen_range(0..orders as i64)),
                    Value::Integer(rng.gen_range(1..10)),
                ]
            })
            .collect(),
    ));
    amalgam
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");

    for customers in [100, 1_000] {
        let amalgam = generate_shop(customers);
        group.bench_with_input(BenchmarkId::new("keys_and_relationships", customers), &amalgam, |b, base| {
            b.iter(|| {
                let mut amalgam = Amalgam::new();
                for table in base.tables().iter() {
                    amalgam.add_table(table.clone());
                }
                amalgam.detect_primary_keys();
                black_box(amalgam.detect_relationships().len())
            })
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    group.sample_size(20);

    for customers in [100, 1_000, 5_000] {
        let mut amalgam = generate_shop(customers);
        amalgam.detect_primary_keys();
        amalgam.detect_relationships();

        group.throughput(Throughput::Elements((customers * 16) as u64));
        group.bench_with_input(BenchmarkId::new("three_tables", customers), &amalgam, |b, amalgam| {
            b.iter(|| black_box(amalgam.merge().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detection, bench_merge);
criterion_main!(benches);
