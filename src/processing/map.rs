//! Per-element transforms, including the price discount.

use crate::error::{QueryError, QueryResult};
use crate::types::Product;

/// Returns a new vector by applying `mapper` to every element of `items`, in order.
pub fn map<T, U, F>(items: &[T], mapper: F) -> Vec<U>
where
    F: FnMut(&T) -> U,
{
    items.iter().map(mapper).collect()
}

/// Check that a discount rate is usable.
///
/// Rates above `1.0` are accepted; the resulting price is clamped at zero by [`discount`].
pub fn validate_discount_rate(rate: f64) -> QueryResult<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(QueryError::precondition(format!(
            "discount rate must be a finite non-negative number, got {rate}"
        )));
    }
    Ok(())
}

/// Copy `product` with its price reduced by `rate` (`0.1` = 10% off).
///
/// The source product is not modified. The new price is `price * (1 - rate)`, clamped at zero.
pub fn discount(product: &Product, rate: f64) -> Product {
    product.with_price(product.price * (1.0 - rate))
}
