//! In-memory query building blocks.
//!
//! The processing layer operates on entity collections handed out by a
//! [`crate::repository::Repository`]. Everything is eager and single-threaded.
//!
//! - [`predicate`]: composable boolean tests over products, customers, and orders
//! - [`Pipeline`]: filter → map → flat_map → distinct → sort → limit → fold chains
//! - [`filter()`] / [`map()`]: one-shot stage helpers over slices
//! - [`reduce`]: the numeric fold used by the sum pipelines
//!
//! ## Example: orders → products → total
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use rust_order_queries::processing::predicate::ordered_within;
//! use rust_order_queries::processing::Pipeline;
//! use rust_order_queries::types::{Customer, Order, Product};
//!
//! let ada = Arc::new(Customer::new(1, "Ada", 2));
//! let pen = Arc::new(Product::new(1, "pen", "Office", 2.5).unwrap());
//! let ink = Arc::new(Product::new(2, "ink", "Office", 4.0).unwrap());
//! let feb = NaiveDate::from_ymd_opt(2021, 2, 14).unwrap();
//! let orders = vec![Arc::new(Order::new(1, ada, feb, vec![pen, ink]))];
//!
//! let total = Pipeline::new(orders)
//!     .filter(&ordered_within(
//!         NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
//!         NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
//!     ))
//!     .flat_map(|o| o.products.clone())
//!     .sum_by(|p| p.price);
//! assert_eq!(total, 6.5);
//! ```

pub mod filter;
pub mod map;
pub mod pipeline;
pub mod predicate;
pub mod reduce;

pub use filter::filter;
pub use map::{discount, map, validate_discount_rate};
pub use pipeline::{Pipeline, StageKind, StageTrace};
pub use predicate::{BiPredicate, Predicate};
pub use reduce::{fold, sum, sum_with};
