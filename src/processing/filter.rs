//! Filtering by [`Predicate`].

use std::borrow::Borrow;

use super::predicate::Predicate;

/// Returns the elements of `items` for which `predicate` holds, in input order.
///
/// Works for owned entities and for shared `Arc<Entity>` handles alike.
pub fn filter<T, P>(items: &[T], predicate: &Predicate<P>) -> Vec<T>
where
    T: Clone + Borrow<P>,
    P: ?Sized + 'static,
{
    items
        .iter()
        .filter(|item| predicate.test(Borrow::<P>::borrow(*item)))
        .cloned()
        .collect()
}
