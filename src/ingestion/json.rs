//! JSON fixture ingestion.
//!
//! Expected document shape:
//!
//! ```json
//! {
//!   "products":  [{"id": 1, "name": "Dune", "category": "Books", "price": 120.0}],
//!   "customers": [{"id": 1, "name": "Ada", "tier": 2}],
//!   "orders":    [{"id": 1, "customer_id": 1, "order_date": "2021-02-10", "product_ids": [1]}]
//! }
//! ```
//!
//! Orders reference customers and products by id. Every reference must resolve; a `null` or
//! unknown id is a precondition violation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{QueryError, QueryResult};
use crate::repository::InMemoryRepository;
use crate::types::{Customer, Order, Product};

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    products: Vec<ProductRecord>,
    #[serde(default)]
    customers: Vec<Customer>,
    #[serde(default)]
    orders: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: u64,
    #[serde(default)]
    name: String,
    category: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    id: u64,
    customer_id: Option<u64>,
    order_date: NaiveDate,
    #[serde(default)]
    product_ids: Vec<Option<u64>>,
}

/// Ingest a JSON fixture file into an [`InMemoryRepository`].
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> QueryResult<InMemoryRepository> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text)
}

/// Ingest a JSON fixture from an in-memory string into an [`InMemoryRepository`].
pub fn ingest_json_from_str(input: &str) -> QueryResult<InMemoryRepository> {
    let fixture: Fixture = serde_json::from_str(input)?;

    let products = fixture
        .products
        .into_iter()
        .map(|r| Product::new(r.id, r.name, r.category, r.price).map(Arc::new))
        .collect::<QueryResult<Vec<_>>>()?;
    let customers: Vec<Arc<Customer>> = fixture.customers.into_iter().map(Arc::new).collect();

    let product_index: HashMap<u64, &Arc<Product>> =
        products.iter().map(|p| (p.id.0, p)).collect();
    let customer_index: HashMap<u64, &Arc<Customer>> =
        customers.iter().map(|c| (c.id.0, c)).collect();

    let mut orders = Vec::with_capacity(fixture.orders.len());
    for record in fixture.orders {
        let customer_id = record.customer_id.ok_or_else(|| {
            QueryError::precondition(format!("order {} has no customer", record.id))
        })?;
        let customer = customer_index.get(&customer_id).ok_or_else(|| {
            QueryError::precondition(format!(
                "order {} references unknown customer {customer_id}",
                record.id
            ))
        })?;

        let mut lines = Vec::with_capacity(record.product_ids.len());
        for (pos, product_id) in record.product_ids.into_iter().enumerate() {
            let product_id = product_id.ok_or_else(|| {
                QueryError::precondition(format!(
                    "order {} has no product at line {}",
                    record.id,
                    pos + 1
                ))
            })?;
            let product = product_index.get(&product_id).ok_or_else(|| {
                QueryError::precondition(format!(
                    "order {} references unknown product {product_id}",
                    record.id
                ))
            })?;
            lines.push(Arc::clone(product));
        }

        orders.push(Arc::new(Order::new(
            record.id,
            Arc::clone(customer),
            record.order_date,
            lines,
        )));
    }

    InMemoryRepository::new(products, customers, orders)
}
