//! Composable boolean tests over entities.
//!
//! A [`Predicate`] is a cloneable function value. Predicates combine with [`Predicate::and`],
//! [`Predicate::or`], and [`Predicate::negate`] without the library knowing about the
//! combination ahead of time. A [`BiPredicate`] takes its comparison value at test time and can
//! be [bound](BiPredicate::bind) into a plain predicate.
//!
//! Category matching comes in two distinct flavours, exact-case ([`category_equals`]) and
//! case-insensitive ([`category_equals_ignore_case`]). Date-range matching on orders is
//! exclusive on both ends by default ([`ordered_within`]); use [`ordered_on`] for equality.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::types::{Customer, Order, Product};

/// A unary boolean test over `T`.
pub struct Predicate<T: ?Sized> {
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized + 'static> Predicate<T> {
    /// Wrap a closure as a predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self { test: Arc::new(f) }
    }

    /// A predicate that accepts everything.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Evaluate the predicate.
    pub fn test(&self, value: &T) -> bool {
        (self.test)(value)
    }

    /// Logical AND; `other` is only evaluated when `self` passes.
    pub fn and(self, other: Predicate<T>) -> Self {
        let (a, b) = (self.test, other.test);
        Self::new(move |v| a(v) && b(v))
    }

    /// Logical OR; `other` is only evaluated when `self` fails.
    pub fn or(self, other: Predicate<T>) -> Self {
        let (a, b) = (self.test, other.test);
        Self::new(move |v| a(v) || b(v))
    }

    /// Logical NOT.
    pub fn negate(self) -> Self {
        let a = self.test;
        Self::new(move |v| !a(v))
    }

    /// Conjunction of every predicate in `predicates`. An empty conjunction accepts everything.
    pub fn all(predicates: impl IntoIterator<Item = Predicate<T>>) -> Self {
        predicates
            .into_iter()
            .reduce(Predicate::and)
            .unwrap_or_else(Self::always)
    }
}

impl<T: ?Sized> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

/// A boolean test over `T` parameterized by a value supplied at test time.
pub struct BiPredicate<T: ?Sized, A: ?Sized> {
    test: Arc<dyn Fn(&T, &A) -> bool + Send + Sync>,
}

impl<T: ?Sized + 'static, A: ?Sized + 'static> BiPredicate<T, A> {
    /// Wrap a two-argument closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T, &A) -> bool + Send + Sync + 'static,
    {
        Self { test: Arc::new(f) }
    }

    /// Evaluate against `arg`.
    pub fn test(&self, value: &T, arg: &A) -> bool {
        (self.test)(value, arg)
    }

    /// Fix the second argument, producing a unary [`Predicate`].
    pub fn bind<B>(&self, arg: B) -> Predicate<T>
    where
        B: Borrow<A> + Send + Sync + 'static,
    {
        let test = Arc::clone(&self.test);
        Predicate::new(move |v| test(v, <B as Borrow<A>>::borrow(&arg)))
    }
}

impl<T: ?Sized, A: ?Sized> Clone for BiPredicate<T, A> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized, A: ?Sized> fmt::Debug for BiPredicate<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiPredicate").finish_non_exhaustive()
    }
}

/// `product.category == expected`, case-sensitive.
pub fn category_equals(expected: impl Into<String>) -> Predicate<Product> {
    let expected = expected.into();
    Predicate::new(move |p: &Product| p.category == expected)
}

/// `product.category` equals `expected` ignoring case.
pub fn category_equals_ignore_case(expected: impl Into<String>) -> Predicate<Product> {
    let expected = expected.into();
    Predicate::new(move |p: &Product| eq_ignore_case(&p.category, &expected))
}

/// Category test taking the category at test time.
pub fn category_matches(case_sensitive: bool) -> BiPredicate<Product, str> {
    if case_sensitive {
        BiPredicate::new(|p: &Product, category: &str| p.category == category)
    } else {
        BiPredicate::new(|p: &Product, category: &str| eq_ignore_case(&p.category, category))
    }
}

/// `product.price > threshold` (strict).
pub fn price_above(threshold: f64) -> Predicate<Product> {
    Predicate::new(move |p: &Product| p.price > threshold)
}

/// `customer.tier == tier`.
pub fn tier_equals(tier: i32) -> Predicate<Customer> {
    Predicate::new(move |c: &Customer| c.tier == tier)
}

/// The order's customer has the given tier.
pub fn customer_tier_equals(tier: i32) -> Predicate<Order> {
    let inner = tier_equals(tier);
    Predicate::new(move |o: &Order| inner.test(&o.customer))
}

/// Placed strictly after `date`.
pub fn ordered_after(date: NaiveDate) -> Predicate<Order> {
    Predicate::new(move |o: &Order| o.order_date > date)
}

/// Placed strictly before `date`.
pub fn ordered_before(date: NaiveDate) -> Predicate<Order> {
    Predicate::new(move |o: &Order| o.order_date < date)
}

/// Placed exactly on `date`.
pub fn ordered_on(date: NaiveDate) -> Predicate<Order> {
    Predicate::new(move |o: &Order| o.order_date == date)
}

/// Placed between `start` and `end` with configurable bound inclusivity.
pub fn ordered_between(
    start: NaiveDate,
    end: NaiveDate,
    inclusive_start: bool,
    inclusive_end: bool,
) -> Predicate<Order> {
    Predicate::new(move |o: &Order| {
        let d = o.order_date;
        let lower = if inclusive_start { d >= start } else { d > start };
        let upper = if inclusive_end { d <= end } else { d < end };
        lower && upper
    })
}

/// Placed after `start` and before `end`, both bounds exclusive.
///
/// With `start == end` nothing matches.
pub fn ordered_within(start: NaiveDate, end: NaiveDate) -> Predicate<Order> {
    ordered_after(start).and(ordered_before(end))
}

/// At least one of the order's products satisfies `product`.
pub fn contains_product(product: Predicate<Product>) -> Predicate<Order> {
    Predicate::new(move |o: &Order| o.products.iter().any(|p| product.test(p)))
}

/// At least one of the order's products is in `category` (case-insensitive).
pub fn contains_category(category: impl Into<String>) -> Predicate<Order> {
    contains_product(category_equals_ignore_case(category))
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
