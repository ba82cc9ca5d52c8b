//! `rust-order-queries` is a small library of declarative query pipelines over an in-memory
//! dataset of [`types::Product`]s, [`types::Customer`]s, and [`types::Order`]s.
//!
//! Pipelines compose filter, map, flatten, distinct, sort, limit, and reduce stages with
//! deterministic ordering: every stage preserves the relative order of the elements it keeps,
//! sorts are stable, and sums are a left-to-right fold seeded with `0.0`.
//!
//! ## What is in the box
//!
//! - [`types`]: the entity model (equality by id; orders share customers and products via `Arc`)
//! - [`repository`]: the snapshot-per-entity [`repository::Repository`] contract and an in-memory
//!   implementation that checks referential integrity
//! - [`processing`]: composable [`processing::Predicate`]s, the [`processing::Pipeline`] stage
//!   chain, and the numeric [`processing::reduce`] fold
//! - [`catalog`]: the fixed set of named pipelines, as functions and as
//!   [`catalog::CatalogQuery`] values
//! - [`execution`]: [`execution::QueryEngine`], which runs catalog queries against a repository
//!   with timing, observer hooks, and metrics
//! - [`ingestion`]: JSON fixture loading into an [`repository::InMemoryRepository`]
//! - [`error`]: the shared [`QueryError`] type
//!
//! ## Quick example: three cheapest books
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_order_queries::catalog::cheapest_products_in_category;
//! use rust_order_queries::types::Product;
//!
//! let products = vec![
//!     Arc::new(Product::new(1, "Dune", "Books", 90.0).unwrap()),
//!     Arc::new(Product::new(2, "Emma", "Books", 30.0).unwrap()),
//!     Arc::new(Product::new(3, "Ulysses", "Books", 60.0).unwrap()),
//! ];
//! let cheapest = cheapest_products_in_category(&products, "Books", 3);
//! let ids: Vec<u64> = cheapest.iter().map(|p| p.id.0).collect();
//! assert_eq!(ids, vec![2, 3, 1]);
//! ```
//!
//! ## Running the catalog with logging
//!
//! ```no_run
//! use std::sync::Arc;
//! use rust_order_queries::catalog::CatalogQuery;
//! use rust_order_queries::execution::{QueryEngine, StdErrQueryObserver};
//! use rust_order_queries::ingestion::ingest_json_from_path;
//!
//! # fn main() -> Result<(), rust_order_queries::QueryError> {
//! let repo = ingest_json_from_path("store.json")?;
//! let engine = QueryEngine::new(repo).with_observer(Arc::new(StdErrQueryObserver));
//! for output in engine.run_all(&CatalogQuery::exercises())? {
//!     println!("{output}");
//! }
//! println!("{}", engine.metrics().snapshot());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod repository;
pub mod types;

pub use error::{QueryError, QueryResult};
