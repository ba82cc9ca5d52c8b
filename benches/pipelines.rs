use std::hint::black_box;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};

use rust_order_queries::catalog::CatalogQuery;
use rust_order_queries::execution::QueryEngine;
use rust_order_queries::repository::InMemoryRepository;
use rust_order_queries::types::{Customer, Order, Product};

const CATEGORIES: [&str; 4] = ["Books", "Baby", "Toys", "Home"];

fn synthetic_repo(n_products: u64, n_orders: u64) -> InMemoryRepository {
    let products: Vec<Arc<Product>> = (0..n_products)
        .map(|i| {
            let category = CATEGORIES[(i % CATEGORIES.len() as u64) as usize];
            Arc::new(Product::new(i, format!("p{i}"), category, (i % 250) as f64 + 0.5).unwrap())
        })
        .collect();
    let customers: Vec<Arc<Customer>> = (0..50)
        .map(|i| Arc::new(Customer::new(i, format!("c{i}"), (i % 3) as i32 + 1)))
        .collect();

    let base = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let orders = (0..n_orders)
        .map(|i| {
            let lines = (0..4)
                .map(|k| Arc::clone(&products[((i * 7 + k * 13) % n_products) as usize]))
                .collect();
            Arc::new(Order::new(
                i,
                Arc::clone(&customers[(i % 50) as usize]),
                base + Days::new(i % 120),
                lines,
            ))
        })
        .collect();

    InMemoryRepository::new(products, customers, orders).unwrap()
}

fn bench_exercises(c: &mut Criterion) {
    let engine = QueryEngine::new(synthetic_repo(2_000, 20_000));
    let queries = CatalogQuery::exercises();

    let mut group = c.benchmark_group("catalog");
    for q in &queries {
        group.bench_function(q.name(), |b| {
            b.iter(|| black_box(engine.run(black_box(q)).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_exercises);
criterion_main!(benches);
