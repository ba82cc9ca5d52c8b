//! Eager, single-pass stage chains.
//!
//! A [`Pipeline`] owns its current sequence and applies one stage at a time. Every stage keeps
//! the input ordering of the elements it retains, and records a [`StageTrace`] so callers can
//! report what each stage produced.
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_order_queries::processing::predicate::category_equals;
//! use rust_order_queries::processing::Pipeline;
//! use rust_order_queries::types::Product;
//!
//! let products = vec![
//!     Arc::new(Product::new(1, "a", "Books", 90.0).unwrap()),
//!     Arc::new(Product::new(2, "b", "Books", 30.0).unwrap()),
//!     Arc::new(Product::new(3, "c", "Books", 60.0).unwrap()),
//! ];
//! let cheapest = Pipeline::new(products)
//!     .filter(&category_equals("Books"))
//!     .sort_by(|a, b| a.price.total_cmp(&b.price))
//!     .limit(2)
//!     .collect();
//! assert_eq!(cheapest.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![2, 3]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use super::predicate::Predicate;
use super::reduce;

/// Kind of stage applied by a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// The input collection.
    Source,
    /// Keep elements satisfying a predicate.
    Filter,
    /// One output per input.
    Map,
    /// Expand each element into a nested sequence.
    FlatMap,
    /// Drop repeated keys, keeping the first occurrence.
    Distinct,
    /// Stable sort.
    Sort,
    /// Truncate to the first N elements.
    Limit,
    /// Observe elements without changing the sequence.
    Inspect,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Source => "source",
            Self::Filter => "filter",
            Self::Map => "map",
            Self::FlatMap => "flat_map",
            Self::Distinct => "distinct",
            Self::Sort => "sort",
            Self::Limit => "limit",
            Self::Inspect => "inspect",
        };
        f.write_str(s)
    }
}

/// What one stage produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTrace {
    /// Stage kind.
    pub kind: StageKind,
    /// Number of elements after the stage ran.
    pub output_len: usize,
}

/// A sequence plus the trace of stages applied to it so far.
#[derive(Debug, Clone)]
pub struct Pipeline<T> {
    items: Vec<T>,
    trace: Vec<StageTrace>,
}

impl<T> Pipeline<T> {
    /// Start a pipeline over `items`.
    pub fn new(items: Vec<T>) -> Self {
        let trace = vec![StageTrace {
            kind: StageKind::Source,
            output_len: items.len(),
        }];
        Self { items, trace }
    }

    fn record(mut self, kind: StageKind) -> Self {
        self.trace.push(StageTrace {
            kind,
            output_len: self.items.len(),
        });
        self
    }

    fn replace<U>(self, items: Vec<U>, kind: StageKind) -> Pipeline<U> {
        let mut trace = self.trace;
        trace.push(StageTrace {
            kind,
            output_len: items.len(),
        });
        Pipeline { items, trace }
    }

    /// Keep elements satisfying `predicate`.
    ///
    /// `T` may be the entity itself or any handle that borrows as it (e.g. `Arc<Product>`).
    pub fn filter<P>(self, predicate: &Predicate<P>) -> Self
    where
        T: Borrow<P>,
        P: ?Sized + 'static,
    {
        self.filter_with(|item| predicate.test(Borrow::<P>::borrow(item)))
    }

    /// Keep elements for which `keep` returns `true`.
    pub fn filter_with<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(|item| keep(item));
        self.record(StageKind::Filter)
    }

    /// Transform every element. `mapper` runs exactly once per element, in order.
    pub fn map<U, F>(mut self, mapper: F) -> Pipeline<U>
    where
        F: FnMut(T) -> U,
    {
        let items = std::mem::take(&mut self.items)
            .into_iter()
            .map(mapper)
            .collect();
        self.replace(items, StageKind::Map)
    }

    /// Transform every element, stopping at the first error.
    pub fn try_map<U, E, F>(mut self, mapper: F) -> Result<Pipeline<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = std::mem::take(&mut self.items)
            .into_iter()
            .map(mapper)
            .collect::<Result<Vec<_>, E>>()?;
        Ok(self.replace(items, StageKind::Map))
    }

    /// Expand each element into a sequence and concatenate the results in input order.
    pub fn flat_map<U, I, F>(mut self, expand: F) -> Pipeline<U>
    where
        I: IntoIterator<Item = U>,
        F: FnMut(T) -> I,
    {
        let items = std::mem::take(&mut self.items)
            .into_iter()
            .flat_map(expand)
            .collect();
        self.replace(items, StageKind::FlatMap)
    }

    /// Drop elements whose key was already seen; the first occurrence wins.
    pub fn distinct_by<K, F>(mut self, mut key: F) -> Self
    where
        K: Eq + Hash,
        F: FnMut(&T) -> K,
    {
        let mut seen = HashSet::with_capacity(self.items.len());
        self.items.retain(|item| seen.insert(key(item)));
        self.record(StageKind::Distinct)
    }

    /// Stable sort: elements comparing equal keep their relative order.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(compare);
        self.record(StageKind::Sort)
    }

    /// Keep at most the first `n` elements.
    pub fn limit(mut self, n: usize) -> Self {
        self.items.truncate(n);
        self.record(StageKind::Limit)
    }

    /// Call `observe` on each element without changing the sequence.
    pub fn inspect<F>(self, mut observe: F) -> Self
    where
        F: FnMut(&T),
    {
        self.items.iter().for_each(|item| observe(item));
        self.record(StageKind::Inspect)
    }

    /// Current number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the current sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stages applied so far, starting with [`StageKind::Source`].
    pub fn trace(&self) -> &[StageTrace] {
        &self.trace
    }

    /// Finish the pipeline, returning the elements.
    pub fn collect(self) -> Vec<T> {
        self.items
    }

    /// Finish the pipeline, returning the elements and the stage trace.
    pub fn into_parts(self) -> (Vec<T>, Vec<StageTrace>) {
        (self.items, self.trace)
    }

    /// Fold the elements left to right from `seed`.
    pub fn fold<A, F>(self, seed: A, combiner: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        reduce::fold(self.items, seed, combiner)
    }

    /// Sum `value(item)` over the elements, seeded with `0.0`.
    pub fn sum_by<F>(self, mut value: F) -> f64
    where
        F: FnMut(&T) -> f64,
    {
        reduce::sum(self.items.iter().map(|item| value(item)))
    }
}
