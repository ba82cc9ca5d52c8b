//! Snapshot access to the three entity collections.
//!
//! Catalog pipelines depend only on [`Repository`], which hands out the current collection for
//! each entity type. [`InMemoryRepository`] is the implementation used by fixture ingestion and
//! tests; it checks referential integrity once, at construction.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::types::{Customer, Order, Product};

/// Source of entity collections.
///
/// Each call returns a snapshot; callers never observe partial updates.
pub trait Repository {
    /// All products.
    fn products(&self) -> Vec<Arc<Product>>;
    /// All customers.
    fn customers(&self) -> Vec<Arc<Customer>>;
    /// All orders.
    fn orders(&self) -> Vec<Arc<Order>>;
}

/// A [`Repository`] backed by in-memory vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    products: Vec<Arc<Product>>,
    customers: Vec<Arc<Customer>>,
    orders: Vec<Arc<Order>>,
}

impl InMemoryRepository {
    /// Build a repository, validating that ids are unique per collection and that every order's
    /// customer and products are part of the supplied collections.
    pub fn new(
        products: Vec<Arc<Product>>,
        customers: Vec<Arc<Customer>>,
        orders: Vec<Arc<Order>>,
    ) -> QueryResult<Self> {
        let mut product_ids = HashSet::with_capacity(products.len());
        for p in &products {
            if !product_ids.insert(p.id) {
                return Err(QueryError::precondition(format!("duplicate product id {}", p.id)));
            }
        }

        let mut customer_ids = HashSet::with_capacity(customers.len());
        for c in &customers {
            if !customer_ids.insert(c.id) {
                return Err(QueryError::precondition(format!("duplicate customer id {}", c.id)));
            }
        }

        let mut order_ids = HashSet::with_capacity(orders.len());
        for o in &orders {
            if !order_ids.insert(o.id) {
                return Err(QueryError::precondition(format!("duplicate order id {}", o.id)));
            }
            if !customer_ids.contains(&o.customer.id) {
                return Err(QueryError::precondition(format!(
                    "order {} references unknown customer {}",
                    o.id, o.customer.id
                )));
            }
            if let Some(p) = o.products.iter().find(|p| !product_ids.contains(&p.id)) {
                return Err(QueryError::precondition(format!(
                    "order {} references unknown product {}",
                    o.id, p.id
                )));
            }
        }

        Ok(Self {
            products,
            customers,
            orders,
        })
    }
}

impl Repository for InMemoryRepository {
    fn products(&self) -> Vec<Arc<Product>> {
        self.products.clone()
    }

    fn customers(&self) -> Vec<Arc<Customer>> {
        self.customers.clone()
    }

    fn orders(&self) -> Vec<Arc<Order>> {
        self.orders.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, 10).unwrap()
    }

    #[test]
    fn accepts_consistent_collections() {
        let p = Arc::new(Product::new(1, "p", "Books", 5.0).unwrap());
        let c = Arc::new(Customer::new(1, "c", 2));
        let o = Arc::new(Order::new(1, c.clone(), date(), vec![p.clone(), p.clone()]));
        let repo = InMemoryRepository::new(vec![p], vec![c], vec![o]).unwrap();
        assert_eq!(repo.products().len(), 1);
        assert_eq!(repo.customers().len(), 1);
        assert_eq!(repo.orders().len(), 1);
    }

    #[test]
    fn rejects_order_with_unknown_customer() {
        let c = Arc::new(Customer::new(9, "ghost", 1));
        let o = Arc::new(Order::new(1, c, date(), vec![]));
        let err = InMemoryRepository::new(vec![], vec![], vec![o]).unwrap_err();
        assert!(err.to_string().contains("unknown customer 9"));
    }

    #[test]
    fn rejects_order_with_unknown_product() {
        let p = Arc::new(Product::new(4, "p", "Toys", 1.0).unwrap());
        let c = Arc::new(Customer::new(1, "c", 1));
        let o = Arc::new(Order::new(1, c.clone(), date(), vec![p]));
        let err = InMemoryRepository::new(vec![], vec![c], vec![o]).unwrap_err();
        assert!(matches!(err, QueryError::PreconditionViolation { .. }));
        assert!(err.to_string().contains("unknown product 4"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let a = Arc::new(Product::new(1, "a", "Toys", 1.0).unwrap());
        let b = Arc::new(Product::new(1, "b", "Toys", 2.0).unwrap());
        let err = InMemoryRepository::new(vec![a, b], vec![], vec![]).unwrap_err();
        assert!(err.to_string().contains("duplicate product id 1"));
    }

    #[test]
    fn empty_repository_is_valid() {
        let repo = InMemoryRepository::default();
        assert!(repo.orders().is_empty());
    }
}
