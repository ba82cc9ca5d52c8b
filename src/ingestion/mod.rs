//! Loading entity collections from fixtures.
//!
//! The query core never reads files itself; it works against a
//! [`crate::repository::Repository`]. This module is the data-loading side: it turns a JSON
//! fixture (see [`json`]) into an [`crate::repository::InMemoryRepository`], resolving every
//! order's customer and product references on the way.

pub mod json;

pub use json::{ingest_json_from_path, ingest_json_from_str};
