//! Numeric aggregation.
//!
//! [`sum`] and [`sum_with`] are the same left-to-right fold seeded with `0.0`, so they return
//! bit-identical results for the same input sequence. Note that `Iterator::sum` for `f64` seeds
//! with `-0.0`, which differs in sign for empty input; it is not used here.

/// Fold `values` left to right starting from `seed`.
pub fn fold<I, A, F>(values: I, seed: A, combiner: F) -> A
where
    I: IntoIterator,
    F: FnMut(A, I::Item) -> A,
{
    values.into_iter().fold(seed, combiner)
}

/// Running sum of `values`, seeded with `0.0`.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    fold(values, 0.0, |acc, v| acc + v)
}

/// Sum over `items` using a caller-supplied `(acc, item) -> acc` accumulator, seeded with `0.0`.
pub fn sum_with<I, F>(items: I, accumulator: F) -> f64
where
    I: IntoIterator,
    F: FnMut(f64, I::Item) -> f64,
{
    fold(items, 0.0, accumulator)
}
